mod extract;
#[cfg(feature = "http")]
pub mod http;

pub use extract::extract_json_block;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::registry::ModelHandle;
use crate::schema::SchemaDescriptor;

/// Role of a chat message in the prompt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in the prompt passed to the model.
///
/// The engine treats the sequence as opaque: prompt content is the caller's
/// concern.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// ModelInvoker abstracts the two provider calling conventions.
///
/// Each method issues exactly one call: no caching, no internal retries, no
/// side effects beyond the network round-trip. The retry controller owns all
/// attempt accounting.
///
/// Implementations must be usable concurrently; the engine shares one invoker
/// across invocations without synchronization.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Issue one call bound to the target schema. The provider validates and
    /// coerces its own output; the returned value is expected to already
    /// satisfy the rendered JSON Schema.
    async fn invoke_structured(
        &self,
        handle: &ModelHandle,
        messages: &[ChatMessage],
        schema: &SchemaDescriptor,
    ) -> Result<Value>;

    /// Issue one plain text call. The raw response is handed to
    /// [`extract_json_block`] by the engine's manual-extraction path.
    async fn invoke_text(&self, handle: &ModelHandle, messages: &[ChatMessage]) -> Result<String>;
}

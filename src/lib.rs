//! Surecall: fail-safe structured outputs from LLMs
//!
//! # Overview
//!
//! Surecall calls a generative-model service, coerces the response into a
//! strongly-typed value conforming to a caller-supplied schema descriptor, and
//! guarantees that a schema-valid value is always returned — even when the
//! service, the network, or the response format fails.
//!
//! Key features:
//! - Explicit, registration-time schema descriptors (scalars, optionals,
//!   unions, collections, maps, nested objects)
//! - Two provider calling conventions: native structured/JSON-schema output
//!   and free text carrying a fenced ```` ```json ```` block
//! - Bounded retries that never leak errors to callers
//! - Synthesized "safe default" instances with distinguishable sentinel
//!   values when all retries are exhausted
//! - Injected progress reporting keyed by (component, entity)
//!
//! # Quick Start
//!
//! ```no_run
//! use surecall::{
//!     ChatMessage, Describe, DescriptorBuilder, Engine, FieldKind, HttpInvoker,
//!     InvokeRequest, SchemaDescriptor,
//! };
//! use serde::{Serialize, Deserialize};
//! use serde_json::json;
//!
//! #[derive(Serialize, Deserialize, Debug)]
//! struct TradeSignal {
//!     signal: String,
//!     confidence: f64,
//!     reasoning: String,
//! }
//!
//! impl Describe for TradeSignal {
//!     fn descriptor() -> SchemaDescriptor {
//!         DescriptorBuilder::new("TradeSignal")
//!             .field(
//!                 "signal",
//!                 FieldKind::Union(vec![
//!                     json!("bullish"),
//!                     json!("bearish"),
//!                     json!("neutral"),
//!                 ]),
//!             )
//!             .field("confidence", FieldKind::Float)
//!             .field("reasoning", FieldKind::String)
//!             .build()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new(HttpInvoker::new());
//!
//!     // Always yields a TradeSignal: the model's validated output, or a
//!     // synthesized default after three failed attempts.
//!     let signal: TradeSignal = engine
//!         .invoke(InvokeRequest::new(
//!             vec![ChatMessage::user("Assess AAPL for the next quarter")],
//!             "gpt-4o",
//!             "OpenAI",
//!         ))
//!         .await?;
//!
//!     println!("{}: {} ({})", signal.signal, signal.confidence, signal.reasoning);
//!     Ok(())
//! }
//! ```
mod backend;
mod error;
pub mod engine;
#[cfg(feature = "logging")]
pub mod logging;
pub mod progress;
pub mod registry;
pub mod schema;

// Re-exports for convenience
pub use backend::{ChatMessage, MessageRole, ModelInvoker, extract_json_block};
pub use engine::{DEFAULT_MAX_RETRIES, Engine, InvokeRequest};
pub use error::{Result, SurecallError};
pub use progress::{ProgressTracker, StatusReporter};
pub use registry::{ModelCapabilities, ModelEntry, ModelHandle, ModelRegistry, Provider};
pub use schema::synth::{DefaultFactory, SENTINEL_STRING, synthesize_default};
pub use schema::{Describe, DescriptorBuilder, FieldDescriptor, FieldKind, SchemaDescriptor};

#[cfg(feature = "http")]
pub use backend::http::HttpInvoker;

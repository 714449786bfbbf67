//! Provider identities and the model registry.
//!
//! The registry is the engine's external collaborator for turning a
//! `(model_name, provider)` pair into a resolved handle plus capability
//! info. Absence on either lookup means "model unavailable": the engine
//! terminates to the synthesized default without consuming attempts.

use std::fmt;
use std::str::FromStr;

use crate::error::SurecallError;

/// The closed enumeration of supported model providers.
///
/// Resolving an unrecognized provider string is a configuration error, not a
/// transient one: the engine returns a synthesized default immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Anthropic,
    DeepSeek,
    Gemini,
    Groq,
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::DeepSeek => "DeepSeek",
            Provider::Gemini => "Gemini",
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Base URL of the provider's OpenAI-compatible endpoint, without a
    /// trailing slash.
    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SurecallError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "deepseek" => Ok(Provider::DeepSeek),
            "gemini" => Ok(Provider::Gemini),
            "groq" => Ok(Provider::Groq),
            "openai" => Ok(Provider::OpenAI),
            _ => Err(SurecallError::InvalidProvider(s.to_string())),
        }
    }
}

/// One model known to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub display_name: String,
    pub model_name: String,
    pub provider: Provider,
    pub supports_structured_output: bool,
}

impl ModelEntry {
    /// Create an entry with the provider's usual structured-output support
    /// (DeepSeek and Gemini models need manual JSON extraction; everyone
    /// else speaks native JSON-schema mode).
    pub fn new(
        display_name: impl Into<String>,
        model_name: impl Into<String>,
        provider: Provider,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            model_name: model_name.into(),
            provider,
            supports_structured_output: !matches!(
                provider,
                Provider::DeepSeek | Provider::Gemini
            ),
        }
    }

    /// Override the structured-output capability flag.
    pub fn structured_output(mut self, supported: bool) -> Self {
        self.supports_structured_output = supported;
        self
    }
}

/// Capability info resolved once per invocation; immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub supports_structured_output: bool,
}

/// A resolved model identity handed to the invoker.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    pub model_name: String,
    pub provider: Provider,
}

/// Registry of known models.
///
/// [`ModelRegistry::built_in`] carries the stock catalog; callers running
/// against custom deployments register their own entries on top or start
/// from [`ModelRegistry::empty`].
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::built_in()
    }
}

impl ModelRegistry {
    /// The stock model catalog.
    pub fn built_in() -> Self {
        let entries = vec![
            ModelEntry::new(
                "[anthropic] claude-3.5-haiku",
                "claude-3-5-haiku-latest",
                Provider::Anthropic,
            ),
            ModelEntry::new(
                "[anthropic] claude-3.5-sonnet",
                "claude-3-5-sonnet-latest",
                Provider::Anthropic,
            ),
            ModelEntry::new(
                "[anthropic] claude-3.7-sonnet",
                "claude-3-7-sonnet-latest",
                Provider::Anthropic,
            ),
            ModelEntry::new("[deepseek] deepseek-r1", "deepseek-reasoner", Provider::DeepSeek),
            ModelEntry::new("[deepseek] deepseek-v3", "deepseek-chat", Provider::DeepSeek),
            ModelEntry::new("[gemini] gemini-2.0-flash", "gemini-2.0-flash", Provider::Gemini),
            ModelEntry::new(
                "[gemini] gemini-2.5-pro",
                "gemini-2.5-pro-exp-03-25",
                Provider::Gemini,
            ),
            ModelEntry::new(
                "[groq] llama-4-scout-17b",
                "meta-llama/llama-4-scout-17b-16e-instruct",
                Provider::Groq,
            ),
            ModelEntry::new(
                "[groq] llama-4-maverick-17b",
                "meta-llama/llama-4-maverick-17b-128e-instruct",
                Provider::Groq,
            ),
            ModelEntry::new("[openai] gpt-4.5", "gpt-4.5-preview", Provider::OpenAI),
            ModelEntry::new("[openai] gpt-4o", "gpt-4o", Provider::OpenAI),
            ModelEntry::new("[openai] o1", "o1", Provider::OpenAI),
            ModelEntry::new("[openai] o3-mini", "o3-mini", Provider::OpenAI),
        ];
        Self { entries }
    }

    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an additional model entry.
    pub fn register(mut self, entry: ModelEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// All known entries, in registration order.
    pub fn models(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Resolve a model handle. `None` when the model is unknown or is not
    /// served by the requested provider.
    pub fn resolve(&self, model_name: &str, provider: Provider) -> Option<ModelHandle> {
        self.entries
            .iter()
            .find(|entry| entry.model_name == model_name && entry.provider == provider)
            .map(|entry| ModelHandle {
                model_name: entry.model_name.clone(),
                provider: entry.provider,
            })
    }

    /// Capability info for a model. `None` when the model is unknown.
    pub fn capabilities(&self, model_name: &str) -> Option<ModelCapabilities> {
        self.entries
            .iter()
            .find(|entry| entry.model_name == model_name)
            .map(|entry| ModelCapabilities {
                supports_structured_output: entry.supports_structured_output,
            })
    }
}

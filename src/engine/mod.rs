//! The retry controller: bounded attempts, status reporting, and fallback to
//! safe-default synthesis.
//!
//! An invocation moves through `Resolving → Attempting(n) → {Succeeded,
//! Exhausted}`. Configuration errors (bad provider string, unresolvable
//! model) bypass the attempt loop entirely; attempt failures are absorbed up
//! to the retry bound, after which the default synthesizer supplies the
//! result. The caller always receives a schema-valid value — the single
//! exception is [`SurecallError::DefaultSynthesisFailure`], which signals a
//! broken schema/default-factory pairing.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::backend::{ChatMessage, ModelInvoker, extract_json_block};
use crate::error::{Result, SurecallError};
use crate::progress::StatusReporter;
use crate::registry::{ModelCapabilities, ModelHandle, ModelRegistry, Provider};
use crate::schema::synth::{DefaultFactory, synthesize_default};
use crate::schema::{Describe, SchemaDescriptor};

/// Attempt bound applied when the caller does not configure one.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// One invocation's inputs.
///
/// Built fluently; only the prompt, model name, and provider are mandatory.
///
/// ```
/// use surecall::{ChatMessage, InvokeRequest};
/// # use surecall::{Describe, DescriptorBuilder, FieldKind, SchemaDescriptor};
/// # use serde::{Serialize, Deserialize};
/// # #[derive(Serialize, Deserialize)]
/// # struct Verdict { reasoning: String }
/// # impl Describe for Verdict {
/// #     fn descriptor() -> SchemaDescriptor {
/// #         DescriptorBuilder::new("Verdict").field("reasoning", FieldKind::String).build()
/// #     }
/// # }
///
/// let request: InvokeRequest<Verdict> = InvokeRequest::new(
///     vec![ChatMessage::user("Assess NVDA")],
///     "gpt-4o",
///     "OpenAI",
/// )
/// .max_retries(5)
/// .agent("valuation")
/// .entity("NVDA");
/// ```
pub struct InvokeRequest<T: Describe> {
    messages: Vec<ChatMessage>,
    model_name: String,
    provider: String,
    max_retries: usize,
    default_factory: Option<DefaultFactory<T>>,
    agent_id: Option<String>,
    entity_id: Option<String>,
}

impl<T: Describe> InvokeRequest<T> {
    pub fn new(
        messages: Vec<ChatMessage>,
        model_name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            model_name: model_name.into(),
            provider: provider.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            default_factory: None,
            agent_id: None,
            entity_id: None,
        }
    }

    /// Hard upper bound on invocation attempts (default 3). Zero skips the
    /// attempt loop entirely and synthesizes a default.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whole-object factory tried before per-field synthesis when retries
    /// are exhausted.
    pub fn default_factory(
        mut self,
        factory: impl Fn() -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.default_factory = Some(Box::new(factory));
        self
    }

    /// Component identity for progress reporting. Without one, attempt
    /// failures are logged but not reported.
    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Entity identity (e.g. a ticker) used as the secondary reporting key.
    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

/// The structured-invocation engine.
///
/// Holds the invoker, the model registry, and an optional status reporter.
/// One engine serves any number of concurrent invocations; each invocation
/// owns its own attempt counter and result, so no synchronization is needed
/// beyond the reporter's own.
pub struct Engine<I> {
    invoker: I,
    registry: ModelRegistry,
    reporter: Option<Arc<dyn StatusReporter>>,
}

impl<I: ModelInvoker> Engine<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            registry: ModelRegistry::built_in(),
            reporter: None,
        }
    }

    /// Replace the built-in model registry.
    pub fn registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attach a status reporter. Shared: the caller owns its lifecycle.
    pub fn reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Ask the model for a typed object and get one back no matter what.
    ///
    /// Resolves the provider and model, performs up to `max_retries`
    /// invocation attempts, and falls back to [`synthesize_default`] on
    /// exhaustion or on configuration errors (which consume no attempts).
    ///
    /// # Errors
    ///
    /// Only [`SurecallError::DefaultSynthesisFailure`]: every retryable
    /// failure is absorbed here.
    #[instrument(
        name = "invoke",
        skip(self, request),
        fields(
            model = %request.model_name,
            provider = %request.provider,
            type_name = std::any::type_name::<T>()
        )
    )]
    pub async fn invoke<T: Describe>(&self, request: InvokeRequest<T>) -> Result<T> {
        let factory = request.default_factory.as_ref();

        // Resolving: configuration errors terminate to default immediately.
        let provider = match Provider::from_str(&request.provider) {
            Ok(provider) => provider,
            Err(e) => {
                error!(error = %e, "invalid provider, returning synthesized default");
                return synthesize_default(factory);
            }
        };
        let Some(handle) = self.registry.resolve(&request.model_name, provider) else {
            error!(
                model = %request.model_name,
                "model not resolvable, returning synthesized default"
            );
            return synthesize_default(factory);
        };
        let Some(capabilities) = self.registry.capabilities(&request.model_name) else {
            error!(
                model = %request.model_name,
                "model capabilities unknown, returning synthesized default"
            );
            return synthesize_default(factory);
        };

        let descriptor = T::descriptor();
        debug!(
            schema = %descriptor.name,
            structured = capabilities.supports_structured_output,
            max_retries = request.max_retries,
            "resolved model, entering attempt loop"
        );

        for attempt in 1..=request.max_retries {
            match self
                .attempt::<T>(&handle, capabilities, &request.messages, &descriptor)
                .await
            {
                Ok(instance) => {
                    info!(attempt, "invocation succeeded");
                    return Ok(instance);
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_retries = request.max_retries,
                        error = %err,
                        "invocation attempt failed"
                    );
                    if let Some(agent_id) = &request.agent_id {
                        if let Some(reporter) = &self.reporter {
                            reporter.report(
                                agent_id,
                                request.entity_id.as_deref(),
                                &format!("Error - retry {}/{}", attempt, request.max_retries),
                            );
                        }
                    }
                    // A mid-loop configuration error (e.g. missing
                    // credentials) cannot improve on retry.
                    if !err.is_retryable() {
                        error!(error = %err, "non-retryable failure, returning synthesized default");
                        return synthesize_default(factory);
                    }
                }
            }
        }

        error!(
            attempts = request.max_retries,
            "all attempts exhausted, returning synthesized default"
        );
        synthesize_default(factory)
    }

    /// One attempt: invoke, coerce, validate.
    async fn attempt<T: Describe>(
        &self,
        handle: &ModelHandle,
        capabilities: ModelCapabilities,
        messages: &[ChatMessage],
        descriptor: &SchemaDescriptor,
    ) -> Result<T> {
        if capabilities.supports_structured_output {
            let value = self
                .invoker
                .invoke_structured(handle, messages, descriptor)
                .await?;
            let instance: T = serde_json::from_value(value).map_err(|e| {
                SurecallError::TypeMismatch(format!(
                    "structured response does not match {}: {}",
                    descriptor.name, e
                ))
            })?;
            instance.validate()?;
            Ok(instance)
        } else {
            let text = self.invoker.invoke_text(handle, messages).await?;
            let value = extract_json_block(&text).ok_or(SurecallError::ExtractionFailure)?;
            let instance: T = serde_json::from_value(value).map_err(|e| {
                SurecallError::ConstructionFailure(format!(
                    "extracted object does not build {}: {}",
                    descriptor.name, e
                ))
            })?;
            instance.validate()?;
            Ok(instance)
        }
    }
}

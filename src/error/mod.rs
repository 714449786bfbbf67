use thiserror::Error;

/// Error types for the Surecall engine.
///
/// The retry controller fully absorbs every retryable variant: callers of
/// [`Engine::invoke`](crate::Engine::invoke) only ever observe a valid value
/// or [`SurecallError::DefaultSynthesisFailure`], which indicates a broken
/// schema/default-factory pairing rather than a runtime fluke.
///
/// # Examples
///
/// ```
/// use surecall::SurecallError;
///
/// let err = SurecallError::InvalidProvider("Bloomberg".into());
/// assert!(!err.is_retryable());
///
/// let err = SurecallError::TransientCallFailure("connection reset".into());
/// assert!(err.is_retryable());
/// ```
#[derive(Error, Debug)]
pub enum SurecallError {
    /// Unrecognized provider identity. A configuration error: recovered
    /// locally with a synthesized default, no retry consumed.
    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    /// The registry could not produce a model handle or capability info.
    /// Recovered locally with a synthesized default, no retry consumed.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A structured-mode response did not match the expected schema type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// No JSON object could be extracted from a free-text response.
    #[error("no JSON object found in response")]
    ExtractionFailure,

    /// An extracted object failed deserialization or validation when
    /// building the typed instance.
    #[error("construction failure: {0}")]
    ConstructionFailure(String),

    /// A network or provider-level error during the call.
    #[error("transient call failure: {0}")]
    TransientCallFailure(String),

    /// The synthesized fallback itself failed schema validation. Fatal:
    /// this is the only variant allowed to surface to the invocation's caller.
    #[error("default synthesis failure: {0}")]
    DefaultSynthesisFailure(String),

    /// HTTP client error (from reqwest)
    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error (from serde_json)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SurecallError {
    /// Whether the retry controller may consume an attempt on this error.
    ///
    /// Configuration errors (`InvalidProvider`, `ModelUnavailable`) terminate
    /// to the synthesized default without consuming attempts, and
    /// `DefaultSynthesisFailure` is fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            SurecallError::TypeMismatch(_)
            | SurecallError::ExtractionFailure
            | SurecallError::ConstructionFailure(_)
            | SurecallError::TransientCallFailure(_)
            | SurecallError::JsonError(_) => true,
            #[cfg(feature = "http")]
            SurecallError::HttpError(_) => true,
            SurecallError::InvalidProvider(_)
            | SurecallError::ModelUnavailable(_)
            | SurecallError::DefaultSynthesisFailure(_) => false,
        }
    }
}

// Manual implementation of PartialEq for SurecallError.
// Note: HttpError and JsonError variants are considered unequal
// because reqwest::Error and serde_json::Error don't implement PartialEq.
impl PartialEq for SurecallError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidProvider(a), Self::InvalidProvider(b)) => a == b,
            (Self::ModelUnavailable(a), Self::ModelUnavailable(b)) => a == b,
            (Self::TypeMismatch(a), Self::TypeMismatch(b)) => a == b,
            (Self::ExtractionFailure, Self::ExtractionFailure) => true,
            (Self::ConstructionFailure(a), Self::ConstructionFailure(b)) => a == b,
            (Self::TransientCallFailure(a), Self::TransientCallFailure(b)) => a == b,
            (Self::DefaultSynthesisFailure(a), Self::DefaultSynthesisFailure(b)) => a == b,
            _ => false,
        }
    }
}

/// A specialized Result type for Surecall operations.
pub type Result<T> = std::result::Result<T, SurecallError>;

/// Errors from the telecom gateway path.
#[derive(Debug, thiserror::Error)]
pub enum TelcoError {
    /// Provider credentials are missing or unusable. Never retried:
    /// retrying cannot fix configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The phone number or bundle size could not be parsed/normalized.
    #[error("Format error: {0}")]
    Format(String),

    /// The provider rejected the request or timed out, after all
    /// retries for the failing leg were exhausted.
    #[error("Provider error: {0}")]
    Provider(String),
}

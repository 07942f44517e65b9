use thiserror::Error;

/// Core error type for skillwire.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
#[derive(Debug, Error)]
pub enum SkillwireError {
    /// Provider id not present in the mapping table.
    #[error("unknown provider: {provider}")]
    UnknownProvider { provider: String },

    /// The mapping references a service type name with no registered factory.
    #[error("provider service not registered: {service}")]
    ServiceNotRegistered { service: String },

    #[error("validation failed: {0}")]
    Validation(String),

    /// Connection, timeout, or TLS failure after the configured retries.
    /// HTTP-level statuses are never mapped here; they come back as
    /// ordinary responses.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = std::result::Result<T, SkillwireError>;

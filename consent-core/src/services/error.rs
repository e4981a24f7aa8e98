use thiserror::Error;

/// Caller-visible outcomes of the consent core.
///
/// Every business variant is terminal: none represents a transient failure
/// and none is retried internally. Only `Storage` wraps faults of the
/// durable-store collaborator, whose retry policy lives outside this core.
#[derive(Debug, Error)]
pub enum ConsentError {
    /// Bad, unknown, or inactive partner key or secret. Deliberately
    /// generic: the cause is recorded in the audit trail, never here.
    #[error("Invalid API credentials or partner account is inactive")]
    InvalidCredentials,

    #[error("Partner has no document categories configured")]
    InvalidConfiguration,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Invalid consent token")]
    TokenNotFound,

    #[error("Consent token has expired")]
    ConsentExpired,

    #[error("Consent has already been granted")]
    ConsentAlreadyGranted,

    #[error("No consent granted. Customer must grant access before documents can be retrieved")]
    ConsentRequired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Discriminant of [`ConsentError`] for programmatic branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentErrorKind {
    InvalidCredentials,
    InvalidConfiguration,
    CustomerNotFound,
    TokenNotFound,
    ConsentExpired,
    ConsentAlreadyGranted,
    ConsentRequired,
    Validation,
    Configuration,
    Storage,
}

impl ConsentError {
    pub fn kind(&self) -> ConsentErrorKind {
        match self {
            ConsentError::InvalidCredentials => ConsentErrorKind::InvalidCredentials,
            ConsentError::InvalidConfiguration => ConsentErrorKind::InvalidConfiguration,
            ConsentError::CustomerNotFound => ConsentErrorKind::CustomerNotFound,
            ConsentError::TokenNotFound => ConsentErrorKind::TokenNotFound,
            ConsentError::ConsentExpired => ConsentErrorKind::ConsentExpired,
            ConsentError::ConsentAlreadyGranted => ConsentErrorKind::ConsentAlreadyGranted,
            ConsentError::ConsentRequired => ConsentErrorKind::ConsentRequired,
            ConsentError::Validation(_) => ConsentErrorKind::Validation,
            ConsentError::Configuration(_) => ConsentErrorKind::Configuration,
            ConsentError::Storage(_) => ConsentErrorKind::Storage,
        }
    }
}

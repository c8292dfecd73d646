//! # Errors
//!
//! The error vocabulary shared by every engine operation. Validation
//! *results* are not errors: an invalid credential is a successfully
//! computed [`crate::validate::ValidationResult`], while the variants here
//! signal that the operation itself could not complete.

use thiserror::Error;

/// Engine errors.
///
/// Business-rule and not-found errors surface unmodified. External
/// collaborator failures (vault, proof service, store) are wrapped in
/// [`Error::ExternalFailure`] and are fatal for the call — never retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The referenced wallet, key, or credential does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An entity with the same id already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller is not permitted to perform the operation, e.g. a
    /// non-authority wallet issuing a restricted credential kind.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed or unsupported input, rejected before any mutation.
    #[error("bad data: {0}")]
    BadData(String),

    /// The wallet holds no signing keys and cannot sign.
    #[error("wallet {0} has no signing key")]
    NoSigningKey(String),

    /// An external dependency (vault, proof service, store) failed.
    #[error(transparent)]
    ExternalFailure(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::ExternalFailure(e.into())
    }
}

/// Shorthand result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

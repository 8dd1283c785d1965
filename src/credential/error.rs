//! Error definitions shared by every credential operation.
//!
//! Every failure carries an [`ErrorKind`] tag and a short description of the
//! operation that failed. The underlying cause, when there is one, is kept as
//! the error source.

use thiserror::Error;

/// Category of a credential failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// Key file missing, unreadable, or permission denied.
    #[error("key file could not be read")]
    FileRead,

    /// Wrong passphrase or malformed key file. The two are not distinguished.
    #[error("key file could not be decrypted")]
    Decryption,

    /// Secure randomness was unavailable.
    #[error("secure key generation failed")]
    Generation,

    /// A new key file could not be persisted.
    #[error("key file could not be written")]
    Write,

    /// Raw key material is not a valid secp256k1 scalar.
    #[error("invalid private key")]
    InvalidKey,

    /// The key decrypted from a file does not derive the address it records.
    #[error("derived address does not match key file")]
    AddressMismatch,

    /// The signer rejected a hash, message, or transaction.
    #[error("signing failed")]
    Signing,

    /// The passphrase environment variable is not set.
    #[error("passphrase not provided")]
    MissingPassphrase,

    /// Configuration lacks a value the operation needs.
    #[error("configuration incomplete")]
    Configuration,
}

/// A failed credential operation.
#[derive(Debug, Error)]
#[error("{operation}: {kind}")]
pub struct CredentialError {
    kind: ErrorKind,
    operation: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CredentialError {
    /// Create an error with no underlying cause.
    pub fn new(kind: ErrorKind, operation: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Description of the operation that failed.
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Annotate a foreign error with a kind and operation description.
pub trait Context<T> {
    fn context(self, kind: ErrorKind, operation: impl Into<String>) -> CredentialResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, kind: ErrorKind, operation: impl Into<String>) -> CredentialResult<T> {
        self.map_err(|e| CredentialError::new(kind, operation).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = CredentialError::new(ErrorKind::Decryption, "decrypt key file keys/a.json");
        assert_eq!(
            err.to_string(),
            "decrypt key file keys/a.json: key file could not be decrypted"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_context_keeps_source() {
        let io: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = io.context(ErrorKind::FileRead, "read key file").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileRead);
        assert_eq!(err.operation(), "read key file");
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }
}

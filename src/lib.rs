//! Concurrency-safe transaction signing credentials.
//!
//! Wraps an Ethereum signing key and its per-account transaction parameters
//! in an exclusive lock, and provisions accounts from encrypted key files or
//! fresh randomness.

pub mod config;
pub mod credential;
pub mod observability;

pub use config::schema::AuthorizerConfig;
pub use credential::{
    generate_credential, generate_key_file, load_key, AccountHandle, CredentialError,
    CredentialGuard, CredentialResult, CredentialStore, ErrorKind, PrivateKey, SigningCredential,
};

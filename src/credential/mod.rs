//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! encrypted key file ─→ keyfile.rs (read, decrypt, verify address)
//! OS randomness ──────→ account.rs (generate, optionally persist)
//!     → PrivateKey (key.rs)
//!     → SigningCredential (signer.rs: AccountSigner + TxParams)
//!     → CredentialStore (store.rs: TxParams behind an exclusive lock)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or passphrases
//! - Passphrases travel as `SecretString`
//! - The credential's mutable fields are only reachable through a guard

pub mod account;
pub mod error;
pub mod key;
pub mod keyfile;
pub mod signer;
pub mod store;

pub use account::{generate_credential, generate_key_file, AccountHandle, KEY_FILE_SCRYPT_N};
pub use error::{Context, CredentialError, CredentialResult, ErrorKind};
pub use key::PrivateKey;
pub use keyfile::{load_credential, load_key, passphrase_from_env, KeyFileMetadata};
pub use signer::{AccountSigner, SigningCredential, TxParams};
pub use store::{CredentialGuard, CredentialStore};

//! Loading accounts from encrypted key files.
//!
//! Key files use the Web3 Secret Storage format produced by `geth account new`
//! and by [`generate_key_file`](crate::credential::account::generate_key_file).
//! Decryption is delegated to alloy's keystore support.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::credential::error::{Context, CredentialError, CredentialResult, ErrorKind};
use crate::credential::key::PrivateKey;
use crate::credential::signer::SigningCredential;
use crate::observability::metrics;

/// Non-secret fields of a key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileMetadata {
    pub id: Option<String>,
    pub version: Option<u32>,
    /// Address recorded by the tool that wrote the file, if any.
    pub address: Option<Address>,
}

#[derive(Deserialize)]
struct RawMetadata {
    id: Option<String>,
    version: Option<u32>,
    address: Option<String>,
    #[allow(dead_code)]
    crypto: serde_json::Value,
}

impl KeyFileMetadata {
    /// Read the non-secret fields of the key file at `path`.
    pub fn read(path: impl AsRef<Path>) -> CredentialResult<Self> {
        let path = path.as_ref();
        let contents = read_key_file(path)?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &[u8]) -> CredentialResult<Self> {
        let raw: RawMetadata = serde_json::from_slice(contents).context(
            ErrorKind::Decryption,
            format!("parse key file {}", path.display()),
        )?;

        let address = raw
            .address
            .as_deref()
            .map(Address::from_str)
            .transpose()
            .context(
                ErrorKind::Decryption,
                format!("parse address recorded in key file {}", path.display()),
            )?;

        Ok(Self {
            id: raw.id,
            version: raw.version,
            address,
        })
    }
}

fn read_key_file(path: &Path) -> CredentialResult<Vec<u8>> {
    fs::read(path).context(ErrorKind::FileRead, format!("read key file {}", path.display()))
}

/// Decrypt the key file at `path` with `passphrase`.
///
/// A wrong passphrase and a malformed file both fail with
/// [`ErrorKind::Decryption`]. If the file records an address, the decrypted
/// key must derive it.
pub fn load_key(path: impl AsRef<Path>, passphrase: &SecretString) -> CredentialResult<PrivateKey> {
    let path = path.as_ref();
    let result = decrypt(path, passphrase);
    metrics::record_keyfile_operation("load", result.is_ok());
    result
}

fn decrypt(path: &Path, passphrase: &SecretString) -> CredentialResult<PrivateKey> {
    let contents = read_key_file(path)?;
    let metadata = KeyFileMetadata::parse(path, &contents)?;

    let signer = PrivateKeySigner::decrypt_keystore(path, passphrase.expose_secret()).context(
        ErrorKind::Decryption,
        format!("decrypt key file {}", path.display()),
    )?;
    let key = PrivateKey::from_signer(signer);

    if let Some(recorded) = metadata.address {
        if recorded != key.address() {
            return Err(CredentialError::new(
                ErrorKind::AddressMismatch,
                format!(
                    "verify key file {}: records {} but key derives {}",
                    path.display(),
                    recorded,
                    key.address()
                ),
            ));
        }
    }

    tracing::info!(
        path = %path.display(),
        address = %key.address(),
        "Key file loaded"
    );

    Ok(key)
}

/// Decrypt a key file and wrap the key into a fresh credential.
pub fn load_credential(
    path: impl AsRef<Path>,
    passphrase: &SecretString,
    chain_id: u64,
) -> CredentialResult<SigningCredential> {
    let key = load_key(path, passphrase)?;
    Ok(SigningCredential::new(&key, chain_id))
}

/// Read a passphrase from an environment variable.
pub fn passphrase_from_env(var_name: &str) -> CredentialResult<SecretString> {
    let passphrase = std::env::var(var_name).context(
        ErrorKind::MissingPassphrase,
        format!("read passphrase from environment variable {}", var_name),
    )?;
    Ok(SecretString::from(passphrase))
}

//! Provisioning new accounts.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::{hex, Address};
use alloy::signers::local::PrivateKeySigner;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::credential::error::{Context, CredentialResult, ErrorKind};
use crate::credential::key::PrivateKey;
use crate::credential::signer::SigningCredential;
use crate::observability::metrics;

/// Scrypt cost parameter `n` written into every generated key file.
pub const KEY_FILE_SCRYPT_N: u32 = 1 << 13;

/// Location and address of a newly persisted key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountHandle {
    pub address: Address,
    pub path: PathBuf,
}

/// Generate a new key and persist it, encrypted with `passphrase`, as a new
/// file in `dir`. The directory is created if it does not exist.
///
/// The file is named the way `geth account new` names it,
/// `UTC--<timestamp>--<address>`. The raw key is not returned.
///
/// Encryption uses the fixed scrypt parameters of alloy's keystore backend:
/// n = 2^13 ([`KEY_FILE_SCRYPT_N`]), r = 8, p = 1. That is 32 times cheaper
/// than geth's standard n = 2^18, so a stolen file is faster to brute-force
/// than one written by geth. Use a strong passphrase.
pub fn generate_key_file(
    dir: impl AsRef<Path>,
    passphrase: &SecretString,
) -> CredentialResult<AccountHandle> {
    let dir = dir.as_ref();
    let result = persist_new_key(dir, passphrase);
    metrics::record_keyfile_operation("generate", result.is_ok());
    result
}

fn persist_new_key(dir: &Path, passphrase: &SecretString) -> CredentialResult<AccountHandle> {
    let key = PrivateKey::random()?;
    let address = key.address();

    fs::create_dir_all(dir).context(
        ErrorKind::Write,
        format!("create key directory {}", dir.display()),
    )?;

    let file_name = key_file_name(address, Utc::now());
    let path = dir.join(&file_name);
    PrivateKeySigner::encrypt_keystore(
        dir,
        &mut OsRng,
        key.expose_bytes().expose_secret(),
        passphrase.expose_secret(),
        Some(file_name.as_str()),
    )
    .context(
        ErrorKind::Write,
        format!("write key file {}", path.display()),
    )?;

    tracing::info!(
        path = %path.display(),
        address = %address,
        "Key file created"
    );

    Ok(AccountHandle { address, path })
}

/// `UTC--2006-01-02T15-04-05.000000000Z--<lowercase hex address>`
fn key_file_name(address: Address, created_at: DateTime<Utc>) -> String {
    format!(
        "UTC--{}--{}",
        created_at.format("%Y-%m-%dT%H-%M-%S%.9fZ"),
        hex::encode(address)
    )
}

/// Generate a new key and wrap it into a credential for `chain_id`.
/// Nothing is written to disk.
pub fn generate_credential(chain_id: u64) -> CredentialResult<(SigningCredential, PrivateKey)> {
    let key = PrivateKey::random()?;
    let credential = SigningCredential::new(&key, chain_id);
    Ok((credential, key))
}

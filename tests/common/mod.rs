//! Shared utilities for integration tests.

use std::path::Path;

use eth_authorizer::credential::{generate_key_file, AccountHandle};
use eth_authorizer::{CredentialStore, PrivateKey};
use secrecy::SecretString;

/// Well-known test private key (Anvil's first account).
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address derived from [`TEST_PRIVATE_KEY`].
#[allow(dead_code)]
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

#[allow(dead_code)]
pub fn passphrase(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

/// A store backed by the Anvil test key on a local chain.
#[allow(dead_code)]
pub fn anvil_store() -> CredentialStore {
    let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
    CredentialStore::from_private_key(&key, 31337)
}

/// Write a fresh key file into `dir`.
#[allow(dead_code)]
pub fn new_key_file(dir: &Path, pass: &str) -> AccountHandle {
    generate_key_file(dir, &passphrase(pass)).unwrap()
}

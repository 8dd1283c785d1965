//! Private key material.
//!
//! # Security
//! - The scalar is held by alloy's `PrivateKeySigner`, which zeroizes on drop
//! - Raw bytes leave this type only wrapped in a `SecretBox`
//! - `Debug` never prints the key

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox};

use crate::credential::error::{Context, CredentialError, CredentialResult, ErrorKind};

/// Out-of-range scalars occur with probability ~2^-128 per draw.
const MAX_GENERATION_ATTEMPTS: usize = 8;

/// A secp256k1 private key.
pub struct PrivateKey {
    signer: PrivateKeySigner,
}

impl PrivateKey {
    /// Generate a key from the operating system's secure random source.
    pub fn random() -> CredentialResult<Self> {
        Self::random_with(&mut OsRng)
    }

    /// Generate a key from the given cryptographically secure source.
    ///
    /// Fails with [`ErrorKind::Generation`] if the source reports an error or
    /// keeps producing out-of-range scalars.
    pub fn random_with<R: RngCore + CryptoRng>(rng: &mut R) -> CredentialResult<Self> {
        let mut bytes = SecretBox::new(Box::new([0u8; 32]));

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            rng.try_fill_bytes(bytes.expose_secret_mut())
                .context(ErrorKind::Generation, "read secure random source")?;

            if let Ok(signer) = PrivateKeySigner::from_slice(bytes.expose_secret()) {
                return Ok(Self { signer });
            }
        }

        Err(CredentialError::new(
            ErrorKind::Generation,
            "draw a valid secp256k1 scalar",
        ))
    }

    /// Create a key from its 32-byte big-endian encoding.
    pub fn from_bytes(bytes: &[u8]) -> CredentialResult<Self> {
        let signer = PrivateKeySigner::from_slice(bytes)
            .context(ErrorKind::InvalidKey, "parse private key bytes")?;
        Ok(Self { signer })
    }

    /// Create a key from a hex string (with or without 0x prefix).
    pub fn from_hex(key_hex: &str) -> CredentialResult<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .context(ErrorKind::InvalidKey, "parse private key hex")?;
        Ok(Self { signer })
    }

    /// Load a hex-encoded key from an environment variable.
    ///
    /// An unset variable is a `Configuration` error. A set but malformed
    /// value is `InvalidKey`.
    pub fn from_env(var_name: &str) -> CredentialResult<Self> {
        let key_hex = std::env::var(var_name).context(
            ErrorKind::Configuration,
            format!("read private key from environment variable {}", var_name),
        )?;

        Self::from_hex(&key_hex)
    }

    pub(crate) fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// The address this key controls.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The raw 32-byte scalar.
    pub fn expose_bytes(&self) -> SecretBox<[u8; 32]> {
        SecretBox::new(Box::new(self.signer.to_bytes().0))
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose_bytes().expose_secret() == other.expose_bytes().expose_secret()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    /// An entropy source that always fails.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy source unavailable",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    /// An entropy source that only ever yields zero, which is not a valid scalar.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    #[test]
    fn test_from_hex() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(key.address().to_string().to_lowercase(), TEST_ADDRESS);

        let prefixed = PrivateKey::from_hex(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(key, prefixed);
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let bytes = key.expose_bytes();
        let restored = PrivateKey::from_bytes(bytes.expose_secret()).unwrap();
        assert_eq!(restored.address(), key.address());
    }

    #[test]
    fn test_invalid_key() {
        let err = PrivateKey::from_hex("invalid_key").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        let err = PrivateKey::from_bytes(&[0u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn test_from_env() {
        let err = PrivateKey::from_env("ETH_AUTHORIZER_TEST_KEY_UNSET").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        std::env::set_var("ETH_AUTHORIZER_TEST_KEY_MALFORMED", "not-hex");
        let err = PrivateKey::from_env("ETH_AUTHORIZER_TEST_KEY_MALFORMED").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        std::env::set_var("ETH_AUTHORIZER_TEST_KEY_SET", format!("0x{TEST_PRIVATE_KEY}"));
        let key = PrivateKey::from_env("ETH_AUTHORIZER_TEST_KEY_SET").unwrap();
        assert_eq!(key, PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap());
    }

    #[test]
    fn test_random_keys_differ() {
        let a = PrivateKey::random().unwrap();
        let b = PrivateKey::random().unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_broken_entropy_source() {
        let err = PrivateKey::random_with(&mut BrokenRng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[test]
    fn test_out_of_range_scalars() {
        let err = PrivateKey::random_with(&mut ZeroRng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", key);

        assert!(!debug_str.contains("ac0974bec"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}

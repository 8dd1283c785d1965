//! Mutex-guarded credential shared by concurrent transaction submitters.
//!
//! # Responsibilities
//! - Own exactly one signing credential per account
//! - Serialize every read and write of its nonce and gas parameters
//! - Release the lock on every exit path (the guard is released on drop)
//!
//! The key and chain id sit outside the lock and cannot be replaced once the
//! store is built. Only [`TxParams`] lives inside it.
//!
//! Waiters are not served in arrival order; only mutual exclusion is guaranteed.

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Instant;

use alloy::consensus::{Signed, TxEip1559};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::Signature;
use secrecy::SecretString;

use crate::config::schema::AuthorizerConfig;
use crate::credential::error::{CredentialError, CredentialResult, ErrorKind};
use crate::credential::key::PrivateKey;
use crate::credential::keyfile;
use crate::credential::signer::{AccountSigner, SigningCredential, TxParams};
use crate::observability::metrics;

/// A signing credential guarded by an exclusive lock.
///
/// Share it between threads with `Arc<CredentialStore>`.
pub struct CredentialStore {
    account: AccountSigner,
    params: Mutex<TxParams>,
}

impl CredentialStore {
    /// Wrap an existing credential.
    pub fn new(credential: SigningCredential) -> Self {
        let (account, params) = credential.into_parts();
        Self {
            account,
            params: Mutex::new(params),
        }
    }

    /// Create a store from a private key.
    pub fn from_private_key(key: &PrivateKey, chain_id: u64) -> Self {
        Self::new(SigningCredential::new(key, chain_id))
    }

    /// Create a store from an encrypted key file.
    pub fn from_key_file(
        path: impl AsRef<Path>,
        passphrase: &SecretString,
        chain_id: u64,
    ) -> CredentialResult<Self> {
        let credential = keyfile::load_credential(path, passphrase, chain_id)?;
        Ok(Self::new(credential))
    }

    /// Create a store from configuration.
    ///
    /// The passphrase is read from the configured environment variable and
    /// the chain's gas defaults are applied to the credential.
    pub fn from_config(config: &AuthorizerConfig) -> CredentialResult<Self> {
        let key_file = config.keystore.key_file.as_ref().ok_or_else(|| {
            CredentialError::new(ErrorKind::Configuration, "locate key file: keystore.key_file not set")
        })?;
        let passphrase = keyfile::passphrase_from_env(&config.keystore.passphrase_env)?;
        let key = keyfile::load_key(key_file, &passphrase)?;

        Ok(Self::new(SigningCredential::from_config(&key, &config.chain)))
    }

    /// The wrapped credential's address. Does not take the lock.
    pub fn address(&self) -> Address {
        self.account.address()
    }

    /// The wrapped credential's chain id. Does not take the lock.
    pub fn chain_id(&self) -> u64 {
        self.account.chain_id()
    }

    /// Block until exclusive ownership of the credential is obtained.
    ///
    /// The lock is released when the returned guard is dropped or passed to
    /// [`CredentialGuard::release`]. A guard cannot be released twice, and
    /// there is nothing to release without one.
    ///
    /// If a previous holder panicked, the credential is recovered as it was
    /// left and a warning is logged.
    pub fn acquire(&self) -> CredentialGuard<'_> {
        let start = Instant::now();
        let params = self
            .params
            .lock()
            .unwrap_or_else(|poisoned| self.recover(poisoned));
        metrics::record_lock_wait(start);

        CredentialGuard {
            account: &self.account,
            params,
        }
    }

    /// Obtain exclusive ownership only if no one else holds it.
    pub fn try_acquire(&self) -> Option<CredentialGuard<'_>> {
        let params = match self.params.try_lock() {
            Ok(params) => params,
            Err(TryLockError::Poisoned(poisoned)) => self.recover(poisoned),
            Err(TryLockError::WouldBlock) => return None,
        };

        Some(CredentialGuard {
            account: &self.account,
            params,
        })
    }

    fn recover<'a>(
        &'a self,
        poisoned: PoisonError<MutexGuard<'a, TxParams>>,
    ) -> MutexGuard<'a, TxParams> {
        tracing::warn!(
            address = %self.address(),
            "Credential lock poisoned by a panicked holder, recovering"
        );
        self.params.clear_poison();
        poisoned.into_inner()
    }

    /// Run `f` with exclusive access to the credential.
    pub fn with<R>(&self, f: impl FnOnce(&mut CredentialGuard<'_>) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut guard)
    }

    pub fn nonce(&self) -> u64 {
        self.acquire().nonce
    }

    /// Set the nonce, e.g. after querying the pending count from chain.
    pub fn set_nonce(&self, nonce: u64) {
        self.acquire().nonce = nonce;
    }

    /// Return the current nonce and advance the counter.
    pub fn next_nonce(&self) -> u64 {
        self.acquire().next_nonce()
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.acquire().gas_limit
    }

    pub fn set_gas_limit(&self, gas_limit: Option<u64>) {
        self.acquire().gas_limit = gas_limit;
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.acquire().gas_price
    }

    pub fn set_gas_price(&self, gas_price: Option<u128>) {
        self.acquire().gas_price = gas_price;
    }

    /// Set both EIP-1559 fee fields in one critical section.
    pub fn set_fees(&self, max_fee_per_gas: Option<u128>, max_priority_fee_per_gas: Option<u128>) {
        let mut guard = self.acquire();
        guard.max_fee_per_gas = max_fee_per_gas;
        guard.max_priority_fee_per_gas = max_priority_fee_per_gas;
    }

    pub fn sign_hash(&self, hash: &B256) -> CredentialResult<Signature> {
        self.acquire().sign_hash(hash)
    }

    pub fn sign_message(&self, message: &[u8]) -> CredentialResult<Signature> {
        self.acquire().sign_message(message)
    }

    /// Assign the next nonce and sign a transfer in one critical section.
    pub fn sign_transfer(
        &self,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> CredentialResult<Signed<TxEip1559>> {
        self.acquire().sign_transfer(to, value, input)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id())
            .finish_non_exhaustive()
    }
}

/// Exclusive ownership of an account's transaction parameters.
///
/// Dereferences to [`TxParams`]. The key and chain id are reachable for
/// signing but cannot be swapped through the guard:
///
/// ```compile_fail
/// use eth_authorizer::credential::{CredentialStore, PrivateKey, SigningCredential};
///
/// let store = CredentialStore::from_private_key(&PrivateKey::random().unwrap(), 1);
/// let other = PrivateKey::random().unwrap();
/// let mut guard = store.acquire();
/// *guard = SigningCredential::new(&other, 5);
/// ```
pub struct CredentialGuard<'a> {
    account: &'a AccountSigner,
    params: MutexGuard<'a, TxParams>,
}

impl CredentialGuard<'_> {
    /// Relinquish ownership. Equivalent to dropping the guard.
    pub fn release(self) {}

    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.account.chain_id()
    }

    pub fn sign_hash(&self, hash: &B256) -> CredentialResult<Signature> {
        self.account.sign_hash(hash)
    }

    pub fn sign_message(&self, message: &[u8]) -> CredentialResult<Signature> {
        self.account.sign_message(message)
    }

    pub fn sign_transaction(&self, tx: TxEip1559) -> CredentialResult<Signed<TxEip1559>> {
        self.account.sign_transaction(tx)
    }

    /// Build a transfer from the held parameters, consuming one nonce.
    pub fn build_transfer(&mut self, to: Address, value: U256, input: Bytes) -> TxEip1559 {
        self.account.build_transfer(&mut self.params, to, value, input)
    }

    /// Build and sign a transfer. The nonce is only consumed if signing succeeds.
    pub fn sign_transfer(
        &mut self,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> CredentialResult<Signed<TxEip1559>> {
        self.account.sign_transfer(&mut self.params, to, value, input)
    }
}

impl Deref for CredentialGuard<'_> {
    type Target = TxParams;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

impl DerefMut for CredentialGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.params
    }
}

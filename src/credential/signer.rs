//! Signing credential: a private key bound to per-account transaction parameters.
//!
//! The key and chain id are fixed at construction ([`AccountSigner`]). Only
//! the nonce and gas fields ([`TxParams`]) change between signing operations.
//!
//! # Security
//! - Keys are held in alloy's PrivateKeySigner
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, Signed, TxEip1559};
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

use crate::config::schema::ChainConfig;
use crate::credential::error::{Context, CredentialResult, ErrorKind};
use crate::credential::key::PrivateKey;
use crate::observability::metrics;

/// Base cost of a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Calldata cost per byte used for the fallback gas estimate.
const GAS_PER_DATA_BYTE: u64 = 16;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Mutable per-account transaction parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxParams {
    /// Nonce assigned to the next transaction.
    pub nonce: u64,
    /// Explicit gas limit. When unset, transfers use a calldata-based estimate.
    pub gas_limit: Option<u64>,
    /// Legacy gas price in wei. Used as the fee cap when no EIP-1559 fees are set.
    pub gas_price: Option<u128>,
    /// EIP-1559 fee cap in wei.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 priority fee in wei.
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TxParams {
    /// Return the current nonce and advance the counter.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }

    /// Overwrite gas parameters with configured defaults.
    pub fn apply_chain_config(&mut self, chain: &ChainConfig) {
        self.gas_limit = chain.gas_limit;
        self.max_fee_per_gas = chain.max_fee_per_gas_gwei.map(gwei_to_wei);
        self.max_priority_fee_per_gas = chain.max_priority_fee_gwei.map(gwei_to_wei);
    }
}

/// The immutable half of a credential: a key bound to a chain id.
#[derive(Clone)]
pub struct AccountSigner {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl AccountSigner {
    fn new(key: &PrivateKey, chain_id: u64) -> Self {
        Self {
            signer: key.signer().clone(),
            chain_id,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a 32-byte hash.
    pub fn sign_hash(&self, hash: &B256) -> CredentialResult<Signature> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .context(ErrorKind::Signing, "sign hash")?;
        metrics::record_signature("hash");
        Ok(signature)
    }

    /// Sign arbitrary message bytes (with Ethereum prefix).
    pub fn sign_message(&self, message: &[u8]) -> CredentialResult<Signature> {
        let signature = self
            .signer
            .sign_message_sync(message)
            .context(ErrorKind::Signing, "sign message")?;
        metrics::record_signature("message");
        Ok(signature)
    }

    /// Sign a fully populated EIP-1559 transaction.
    ///
    /// The transaction's chain id is not checked against the signer's.
    pub fn sign_transaction(&self, tx: TxEip1559) -> CredentialResult<Signed<TxEip1559>> {
        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .context(ErrorKind::Signing, format!("sign transaction with nonce {}", tx.nonce))?;
        metrics::record_signature("transaction");
        Ok(tx.into_signed(signature))
    }

    /// Build an EIP-1559 transaction from `params`, consuming one nonce.
    pub fn build_transfer(
        &self,
        params: &mut TxParams,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> TxEip1559 {
        // Base gas + data cost (16 gas per byte, simplified)
        let gas_limit = params
            .gas_limit
            .unwrap_or(TRANSFER_GAS + input.len() as u64 * GAS_PER_DATA_BYTE);
        let max_fee_per_gas = params.max_fee_per_gas.or(params.gas_price).unwrap_or_default();
        let max_priority_fee_per_gas = params
            .max_priority_fee_per_gas
            .unwrap_or_default()
            .min(max_fee_per_gas);

        TxEip1559 {
            chain_id: self.chain_id,
            nonce: params.next_nonce(),
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to: TxKind::Call(to),
            value,
            input,
            ..Default::default()
        }
    }

    /// Build and sign a transfer. The nonce is only consumed if signing succeeds.
    pub fn sign_transfer(
        &self,
        params: &mut TxParams,
        to: Address,
        value: U256,
        input: Bytes,
    ) -> CredentialResult<Signed<TxEip1559>> {
        let nonce = params.nonce;
        let tx = self.build_transfer(params, to, value, input);

        match self.sign_transaction(tx) {
            Ok(signed) => {
                tracing::debug!(
                    address = %self.address(),
                    nonce = nonce,
                    tx_hash = %signed.hash(),
                    "Transaction signed"
                );
                Ok(signed)
            }
            Err(e) => {
                params.nonce = nonce;
                Err(e)
            }
        }
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for AccountSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSigner")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// A private key plus the mutable per-account parameters needed to produce
/// valid signed transactions.
///
/// Not synchronized. Share it between threads through
/// [`CredentialStore`](crate::credential::CredentialStore).
#[derive(Debug)]
pub struct SigningCredential {
    account: AccountSigner,
    /// Nonce and gas parameters, mutated by call sites between signatures.
    pub params: TxParams,
}

impl SigningCredential {
    /// Wrap a private key for signing on `chain_id`.
    pub fn new(key: &PrivateKey, chain_id: u64) -> Self {
        let account = AccountSigner::new(key, chain_id);

        tracing::info!(
            address = %account.address(),
            chain_id = chain_id,
            "Signing credential initialized"
        );

        Self {
            account,
            params: TxParams::default(),
        }
    }

    /// Wrap a private key using the chain id and gas defaults from configuration.
    pub fn from_config(key: &PrivateKey, chain: &ChainConfig) -> Self {
        let mut credential = Self::new(key, chain.chain_id);
        credential.params.apply_chain_config(chain);
        credential
    }

    /// Split into the immutable signer and the mutable parameters.
    pub fn into_parts(self) -> (AccountSigner, TxParams) {
        (self.account, self.params)
    }

    pub fn account(&self) -> &AccountSigner {
        &self.account
    }

    /// The credential's address.
    pub fn address(&self) -> Address {
        self.account.address()
    }

    /// The chain id transactions are signed for.
    pub fn chain_id(&self) -> u64 {
        self.account.chain_id()
    }

    /// Return the current nonce and advance the counter.
    pub fn next_nonce(&mut self) -> u64 {
        self.params.next_nonce()
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

    /// Build an EIP-1559 transaction from the credential's parameters,
    /// consuming one nonce.
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

fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * WEI_PER_GWEI
}

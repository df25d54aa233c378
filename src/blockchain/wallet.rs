//! Account keys and transaction signing.
//!
//! # Security
//! - Keys come from the static account list in configuration
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A configured account able to sign chain-tagged transactions.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet loaded"
        );

        Ok(Self { signer, chain_id })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet signs for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a legacy transaction and return its wire encoding.
    ///
    /// The transaction is tagged with this wallet's chain id before signing,
    /// so the signature commits to the target network.
    pub fn sign_transaction(&self, mut tx: TxLegacy) -> BlockchainResult<Bytes> {
        tx.chain_id = Some(self.chain_id);

        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
        Ok(envelope.encoded_2718().into())
    }
}

//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was mined with a failed status.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Calldata or return data did not match the contract ABI.
    #[error("ABI error: {0}")]
    Abi(String),

    /// The receipt did not carry an expected log entry.
    #[error("Missing event: {0}")]
    MissingEvent(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// A log entry emitted while executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Receipt of a submitted transaction, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedTx {
    /// `true` when the transaction executed successfully.
    pub status: bool,
    pub transaction_hash: TxHash,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub logs: Vec<ReceiptLog>,
}

impl SubmittedTx {
    /// Turn a failed receipt into a [`BlockchainError::Reverted`].
    pub fn ensure_success(self) -> BlockchainResult<Self> {
        if self.status {
            Ok(self)
        } else {
            Err(BlockchainError::Reverted {
                tx_hash: self.transaction_hash,
            })
        }
    }
}

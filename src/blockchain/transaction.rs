//! Transaction building, signing, and submission.
//!
//! # Responsibilities
//! - Fetch the sender's pending nonce and the gas price
//! - Build chain-tagged legacy transactions from a [`TxIntent`]
//! - Sign with the sender's raw key and broadcast the wire encoding
//! - Surface failed receipts as structured errors

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use std::sync::Arc;

use crate::blockchain::client::ChainRpc;
use crate::blockchain::types::{BlockchainResult, SubmittedTx};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::GasSettings;
use crate::registry::KeyedLocks;

/// What a transaction should do, before nonce, price and signature are known.
#[derive(Debug, Clone)]
pub struct TxIntent {
    /// Destination contract; `None` creates a contract.
    pub to: Option<Address>,
    pub input: Bytes,
    /// Native value transferred with the call.
    pub value: U256,
    pub gas: GasSettings,
}

impl TxIntent {
    /// A contract creation carrying bytecode and constructor arguments.
    pub fn create(input: Bytes, gas: GasSettings) -> Self {
        Self {
            to: None,
            input,
            value: U256::ZERO,
            gas,
        }
    }

    /// A call against an existing contract.
    pub fn call(to: Address, input: Bytes, gas: GasSettings) -> Self {
        Self {
            to: Some(to),
            input,
            value: U256::ZERO,
            gas,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Builds, signs and submits transactions for any configured wallet.
#[derive(Clone)]
pub struct TxBuilder {
    chain: Arc<dyn ChainRpc>,
    /// One submission in flight per sender, so pending nonces never collide.
    senders: KeyedLocks<Address>,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(chain: Arc<dyn ChainRpc>) -> Self {
        Self {
            chain,
            senders: KeyedLocks::new(),
        }
    }

    /// Build an unsigned transaction with the sender's pending nonce.
    ///
    /// The gas price comes from the intent when fixed, otherwise from the node.
    pub async fn build(&self, wallet: &Wallet, intent: TxIntent) -> BlockchainResult<TxLegacy> {
        let nonce = self.chain.pending_nonce(wallet.address()).await?;

        let gas_price = match intent.gas.gas_price {
            Some(price) => u128::from(price),
            None => self.chain.gas_price().await?,
        };

        Ok(TxLegacy {
            chain_id: Some(wallet.chain_id()),
            nonce,
            gas_price,
            gas_limit: intent.gas.gas_limit,
            to: intent.to.map_or(TxKind::Create, TxKind::Call),
            value: intent.value,
            input: intent.input,
        })
    }

    /// Build, sign and submit, returning the receipt of a successful transaction.
    ///
    /// A mined-but-failed transaction is returned as `BlockchainError::Reverted`.
    pub async fn send(&self, wallet: &Wallet, intent: TxIntent) -> BlockchainResult<SubmittedTx> {
        let lock = self.senders.lock_for(wallet.address());
        let _guard = lock.lock().await;

        let tx = self.build(wallet, intent).await?;
        let nonce = tx.nonce;
        let raw = wallet.sign_transaction(tx)?;

        tracing::debug!(
            from = %wallet.address(),
            nonce = nonce,
            "Submitting signed transaction"
        );

        let receipt = self.chain.submit(raw).await?;
        receipt.ensure_success()
    }
}

impl std::fmt::Debug for TxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxBuilder")
            .field("active_senders", &self.senders.len())
            .finish()
    }
}

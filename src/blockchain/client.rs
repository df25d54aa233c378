//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint of the permissioned network
//! - Query nonces, gas price and read-only contract calls
//! - Submit raw transactions and wait for their receipts
//! - Provide health check for blockchain connectivity

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ReceiptLog, SubmittedTx,
};
use crate::observability::metrics;

/// The RPC surface the bridge needs from a chain node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Latest block number.
    async fn block_number(&self) -> BlockchainResult<u64>;

    /// Next nonce for `address`, counting transactions still in the pool.
    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Node-recommended gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> BlockchainResult<Bytes>;

    /// Broadcast a signed transaction and wait for its receipt.
    async fn submit(&self, raw: Bytes) -> BlockchainResult<SubmittedTx>;
}

/// Blockchain RPC client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
    /// How long to wait for a submitted transaction to be mined.
    receipt_timeout: Duration,
}

impl ChainClient {
    /// Create a new blockchain client.
    ///
    /// Fails only on an unparsable RPC URL. A node that cannot be reached or
    /// reports a different chain id is logged and tolerated.
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let rpc_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider =
            Arc::new(ProviderBuilder::new().connect_http(rpc_url)) as Arc<dyn Provider + Send + Sync>;

        let client = Self {
            provider,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            config,
        };

        if client.config.verify_chain_id {
            match client.verify_chain_id().await {
                Ok(()) => {
                    tracing::info!(
                        rpc_url = %client.config.rpc_url,
                        chain_id = client.config.chain_id,
                        "Blockchain client initialized"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Blockchain client initialized but chain verification failed"
                    );
                }
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Run one RPC future under the configured timeout.
    async fn rpc<T, E, F>(&self, method: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: Future<Output = Result<T, E>> + Send,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(method = method, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{}: {}", method, e)))
            }
            Err(_) => {
                tracing::warn!(method = method, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }
}

#[async_trait]
impl ChainRpc for ChainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.rpc("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        let result = self
            .rpc("eth_blockNumber", self.provider.get_block_number())
            .await;
        metrics::record_chain_health(result.is_ok());
        result
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        let fut = self.provider.get_transaction_count(address).pending();
        self.rpc("eth_getTransactionCount", fut.into_future()).await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.rpc("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let mut request = TransactionRequest::default().with_to(to).with_input(data);
        if let Some(from) = from {
            request = request.with_from(from);
        }
        self.rpc("eth_call", self.provider.call(request).into_future())
            .await
    }

    async fn submit(&self, raw: Bytes) -> BlockchainResult<SubmittedTx> {
        let pending = self
            .rpc(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(&raw),
            )
            .await?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "Transaction broadcast, awaiting receipt");

        let receipt = match timeout(self.receipt_timeout, pending.get_receipt()).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt retrieval failed");
                return Err(BlockchainError::Rpc(format!("receipt for {}: {}", tx_hash, e)));
            }
            Err(_) => {
                tracing::warn!(tx_hash = %tx_hash, "Receipt timeout");
                return Err(BlockchainError::Timeout(self.config.receipt_timeout_secs));
            }
        };

        Ok(submitted_from_receipt(&receipt))
    }
}

/// Flatten an RPC receipt into the bridge's receipt view.
fn submitted_from_receipt(receipt: &TransactionReceipt) -> SubmittedTx {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| ReceiptLog {
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        })
        .collect();

    SubmittedTx {
        status: receipt.status(),
        transaction_hash: receipt.transaction_hash,
        block_hash: receipt.block_hash,
        block_number: receipt.block_number,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        logs,
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

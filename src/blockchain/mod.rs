//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Configured account (name → private key)
//!     → wallet.rs (key parsing, EIP-155 signing)
//!     → transaction.rs (nonce, gas, build, sign, submit)
//!     → client.rs (JSON-RPC with timeouts)
//!     → receipt (status, hashes, logs)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod abi;
pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, ChainRpc};
pub use transaction::{TxBuilder, TxIntent};
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ReceiptLog, SubmittedTx};
pub use wallet::Wallet;

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the flight bridge.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Chain endpoint settings.
    pub blockchain: BlockchainConfig,

    /// Gas limit and price per operation kind.
    pub gas: GasPolicy,

    /// Flight contract artifact.
    pub contract: ContractConfig,

    /// Accounts allowed to sign, by name.
    pub accounts: Vec<AccountConfig>,

    /// Plane models and their seat categories.
    pub plane_models: Vec<PlaneModelConfig>,

    /// Human names for the contract's flight status codes.
    pub flight_statuses: Vec<FlightStatusConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            blockchain: BlockchainConfig::default(),
            gas: GasPolicy::default(),
            contract: ContractConfig::default(),
            accounts: Vec::new(),
            plane_models: Vec::new(),
            flight_statuses: default_flight_statuses(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Timeout configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 240 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Blockchain endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID every transaction is tagged with.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum wait for a submitted transaction's receipt, in seconds.
    pub receipt_timeout_secs: u64,

    /// Check the node's chain id at startup.
    pub verify_chain_id: bool,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://bootnode:8545".to_string(),
            chain_id: 1337,
            rpc_timeout_secs: 30,
            receipt_timeout_secs: 120,
            verify_chain_id: true,
        }
    }
}

/// Gas limit and optional fixed price for one kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GasSettings {
    pub gas_limit: u64,

    /// Fixed gas price in wei; the node's price is used when absent.
    #[serde(default)]
    pub gas_price: Option<u64>,
}

/// Gas settings per operation kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasPolicy {
    /// Flight contract deployment.
    pub deploy: GasSettings,

    /// Seat booking (value-bearing call on the flight contract).
    pub book: GasSettings,

    /// Cancel, claim and collect calls on a ticket contract.
    pub ticket: GasSettings,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            deploy: GasSettings {
                gas_limit: 8_000_000,
                gas_price: Some(47_000),
            },
            book: GasSettings {
                gas_limit: 10_000_000,
                gas_price: Some(4_000_000),
            },
            ticket: GasSettings {
                gas_limit: 10_000_000,
                gas_price: None,
            },
        }
    }
}

/// Flight contract artifact. Exactly one of the two sources must be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Creation bytecode as hex (with or without 0x).
    pub bytecode: Option<String>,

    /// File holding the creation bytecode as hex.
    pub bytecode_path: Option<PathBuf>,
}

/// A named signing account.
#[derive(Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub name: String,

    /// Hex-encoded private key.
    pub private_key: String,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("name", &self.name)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A plane model and the seat categories its flights sell.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaneModelConfig {
    /// Model code passed to the flight contract (e.g., "A320").
    pub code: String,

    #[serde(default)]
    pub seat_categories: Vec<SeatCategory>,
}

/// A class of seat, its contract code and its price.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeatCategory {
    pub name: String,

    /// Seat-class code understood by the flight contract.
    pub value: u8,

    /// Price in wei sent with the booking.
    pub cost: u64,
}

/// Name for a flight status code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightStatusConfig {
    pub value: u8,
    pub name: String,
}

fn default_flight_statuses() -> Vec<FlightStatusConfig> {
    ["On Time", "Delayed", "Cancelled", "Departed", "Landed"]
        .iter()
        .enumerate()
        .map(|(value, name)| FlightStatusConfig {
            value: value as u8,
            name: name.to_string(),
        })
        .collect()
}

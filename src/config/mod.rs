//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! bridge.toml
//!     → loader.rs (parse & deserialize, resolve contract bytecode)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → reference.rs (typed account / seat / status lookups)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never reloaded
//! - All sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod reference;
pub mod schema;
pub mod validation;

pub use loader::{contract_bytecode, load_config, ConfigError};
pub use reference::{LookupError, ReferenceData};
pub use schema::{
    AccountConfig, BlockchainConfig, BridgeConfig, GasPolicy, GasSettings, ObservabilityConfig,
    PlaneModelConfig, SeatCategory,
};

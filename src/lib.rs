//! Flight ticket booking bridge.
//!
//! Exposes an HTTP API that deploys flight contracts and books, cancels,
//! claims and collects tickets on an Ethereum-compatible chain.

pub mod blockchain;
pub mod booking;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::schema::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

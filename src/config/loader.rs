//! Configuration loading from disk.

use alloy::primitives::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{BridgeConfig, ContractConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid contract bytecode: {0}")]
    Bytecode(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BridgeConfig, ConfigError> {
    let config: BridgeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the flight contract's creation bytecode from inline hex or a file.
pub fn contract_bytecode(contract: &ContractConfig) -> Result<Bytes, ConfigError> {
    let hex = match (&contract.bytecode, &contract.bytecode_path) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?,
        (None, None) => return Err(ConfigError::Bytecode("no bytecode configured".to_string())),
    };

    let bytes = alloy::hex::decode(hex.trim()).map_err(|e| ConfigError::Bytecode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ConfigError::Bytecode("bytecode is empty".to_string()));
    }
    Ok(bytes.into())
}

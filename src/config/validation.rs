//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and returns every
//! problem found, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::blockchain::wallet::Wallet;
use crate::config::schema::{BridgeConfig, GasSettings};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let chain = &config.blockchain;
    let submit_budget = 2 * chain.rpc_timeout_secs + chain.receipt_timeout_secs;
    if config.timeouts.request_secs > 0 && config.timeouts.request_secs <= submit_budget {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed 2 * rpc_timeout_secs + receipt_timeout_secs ({})",
                submit_budget
            ),
        ));
    }

    validate_blockchain(config, &mut errors);
    validate_contract(config, &mut errors);
    validate_accounts(config, &mut errors);
    validate_plane_models(config, &mut errors);

    let mut statuses = HashSet::new();
    for status in &config.flight_statuses {
        if !statuses.insert(status.value) {
            errors.push(ValidationError::new(
                "flight_statuses",
                format!("status value {} is defined twice", status.value),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_blockchain(config: &BridgeConfig, errors: &mut Vec<ValidationError>) {
    let chain = &config.blockchain;
    if let Err(e) = chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a URL: {}", chain.rpc_url, e),
        ));
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be non-zero"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than zero"));
    }
    if chain.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.receipt_timeout_secs",
            "must be greater than zero",
        ));
    }

    let gas: [(&str, &GasSettings); 3] = [
        ("gas.deploy", &config.gas.deploy),
        ("gas.book", &config.gas.book),
        ("gas.ticket", &config.gas.ticket),
    ];
    for (field, settings) in gas {
        if settings.gas_limit < 21_000 {
            errors.push(ValidationError::new(
                format!("{}.gas_limit", field),
                "must be at least 21000",
            ));
        }
    }
}

fn validate_contract(config: &BridgeConfig, errors: &mut Vec<ValidationError>) {
    let contract = &config.contract;
    match (&contract.bytecode, &contract.bytecode_path) {
        (None, None) => errors.push(ValidationError::new(
            "contract",
            "one of bytecode or bytecode_path is required",
        )),
        (Some(_), Some(_)) => errors.push(ValidationError::new(
            "contract",
            "bytecode and bytecode_path are mutually exclusive",
        )),
        (Some(hex), None) => match alloy::hex::decode(hex.trim()) {
            Ok(bytes) if bytes.is_empty() => {
                errors.push(ValidationError::new("contract.bytecode", "is empty"));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new(
                "contract.bytecode",
                format!("invalid hex: {}", e),
            )),
        },
        // The file is read by the loader, which reports its own errors.
        (None, Some(_)) => {}
    }
}

fn validate_accounts(config: &BridgeConfig, errors: &mut Vec<ValidationError>) {
    let mut names = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        let field = format!("accounts[{}]", i);
        if account.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !names.insert(account.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("account '{}' is defined twice", account.name),
            ));
        }
        if Wallet::from_private_key(&account.private_key, config.blockchain.chain_id).is_err() {
            // Never echo the key itself.
            errors.push(ValidationError::new(
                format!("{}.private_key", field),
                "is not a valid private key",
            ));
        }
    }
}

fn validate_plane_models(config: &BridgeConfig, errors: &mut Vec<ValidationError>) {
    let mut codes = HashSet::new();
    for model in &config.plane_models {
        let field = format!("plane_models[{}]", model.code);
        if !codes.insert(model.code.as_str()) {
            errors.push(ValidationError::new(field.clone(), "plane model is defined twice"));
        }
        if model.seat_categories.is_empty() {
            errors.push(ValidationError::new(field.clone(), "has no seat categories"));
        }

        let mut names = HashSet::new();
        let mut values = HashSet::new();
        for category in &model.seat_categories {
            if !names.insert(category.name.as_str()) {
                errors.push(ValidationError::new(
                    field.clone(),
                    format!("seat category '{}' is defined twice", category.name),
                ));
            }
            if !values.insert(category.value) {
                errors.push(ValidationError::new(
                    field.clone(),
                    format!("seat category value {} is used twice", category.value),
                ));
            }
        }
    }
}

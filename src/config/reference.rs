//! Typed lookups over the static reference data: accounts, plane models,
//! seat categories and flight status names.

use std::collections::HashMap;
use thiserror::Error;

use crate::blockchain::types::BlockchainResult;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::{BridgeConfig, SeatCategory};

/// A reference lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Plane model '{0}' not found")]
    PlaneModelNotFound(String),

    #[error("Seat category '{name}' not found for plane model '{model}'")]
    SeatCategoryNotFound { model: String, name: String },

    #[error("Seat class {value} not found for plane model '{model}'")]
    SeatClassNotFound { model: String, value: u8 },

    #[error("Flight status {0} not found")]
    FlightStatusNotFound(u8),
}

/// Immutable reference data, built once at startup.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    wallets: HashMap<String, Wallet>,
    plane_models: HashMap<String, Vec<SeatCategory>>,
    flight_statuses: HashMap<u8, String>,
}

impl ReferenceData {
    /// Index the configuration, parsing every account key.
    pub fn from_config(config: &BridgeConfig) -> BlockchainResult<Self> {
        let chain_id = config.blockchain.chain_id;
        let wallets = config
            .accounts
            .iter()
            .map(|account| {
                Wallet::from_private_key(&account.private_key, chain_id)
                    .map(|wallet| (account.name.clone(), wallet))
            })
            .collect::<BlockchainResult<HashMap<_, _>>>()?;

        let plane_models = config
            .plane_models
            .iter()
            .map(|model| (model.code.clone(), model.seat_categories.clone()))
            .collect();

        let flight_statuses = config
            .flight_statuses
            .iter()
            .map(|status| (status.value, status.name.clone()))
            .collect();

        Ok(Self {
            wallets,
            plane_models,
            flight_statuses,
        })
    }

    /// Wallet for a configured account name.
    pub fn wallet(&self, account: &str) -> Result<&Wallet, LookupError> {
        self.wallets
            .get(account)
            .ok_or_else(|| LookupError::AccountNotFound(account.to_string()))
    }

    /// Seat categories offered by a plane model.
    pub fn seat_categories(&self, model: &str) -> Result<&[SeatCategory], LookupError> {
        self.plane_models
            .get(model)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::PlaneModelNotFound(model.to_string()))
    }

    /// Seat category of a plane model by its name.
    pub fn seat_category(&self, model: &str, name: &str) -> Result<&SeatCategory, LookupError> {
        self.seat_categories(model)?
            .iter()
            .find(|category| category.name == name)
            .ok_or_else(|| LookupError::SeatCategoryNotFound {
                model: model.to_string(),
                name: name.to_string(),
            })
    }

    /// Human name for a flight status code.
    pub fn flight_status(&self, value: u8) -> Result<&str, LookupError> {
        self.flight_statuses
            .get(&value)
            .map(String::as_str)
            .ok_or(LookupError::FlightStatusNotFound(value))
    }
}

/// Seat category with the given contract code.
pub fn seat_class_by_value<'a>(
    categories: &'a [SeatCategory],
    model: &str,
    value: u8,
) -> Result<&'a SeatCategory, LookupError> {
    categories
        .iter()
        .find(|category| category.value == value)
        .ok_or_else(|| LookupError::SeatClassNotFound {
            model: model.to_string(),
            value,
        })
}

//! Registry of deployed flight contracts.

use alloy::primitives::{Address, TxHash, B256};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::observability::metrics;
use crate::registry::RegistryError;

/// A flight contract deployed through the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedFlight {
    pub flight_number: String,
    /// Scheduled departure as supplied by the caller.
    pub scheduled_time: String,
    /// Scheduled departure in unix seconds, as passed to the contract.
    pub scheduled_unix: u64,
    /// Plane model code.
    pub model: String,
    pub contract_address: Address,
    pub block_hash: Option<B256>,
    pub status: bool,
    pub transaction_hash: TxHash,
}

/// Deployed flights keyed by flight number. Entries live for the process
/// lifetime.
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    inner: Arc<DashMap<String, DeployedFlight>>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deployment. A flight number can be registered only once.
    pub fn register(&self, flight: DeployedFlight) -> Result<(), RegistryError> {
        match self.inner.entry(flight.flight_number.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateFlight(flight.flight_number)),
            Entry::Vacant(slot) => {
                slot.insert(flight);
            }
        }
        metrics::record_registry_size("flights", self.inner.len());
        Ok(())
    }

    pub fn contains(&self, flight_number: &str) -> bool {
        self.inner.contains_key(flight_number)
    }

    /// Look up a flight by number.
    pub fn get(&self, flight_number: &str) -> Option<DeployedFlight> {
        self.inner.get(flight_number).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

//! Registry of booked tickets.

use alloy::primitives::Address;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::observability::metrics;

/// A ticket booked through the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedTicket {
    /// Assigned by the flight contract at booking time.
    pub confirmation_id: String,
    pub flight_number: String,
    pub flight_contract: Address,
    pub ticket_contract: Address,
}

/// Booked tickets keyed by confirmation id.
#[derive(Debug, Clone, Default)]
pub struct TicketRegistry {
    inner: Arc<DashMap<String, BookedTicket>>,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, ticket: BookedTicket) {
        self.inner.insert(ticket.confirmation_id.clone(), ticket);
        metrics::record_registry_size("tickets", self.inner.len());
    }

    pub fn get(&self, confirmation_id: &str) -> Option<BookedTicket> {
        self.inner.get(confirmation_id).map(|r| r.value().clone())
    }

    /// Remove and return a ticket.
    ///
    /// Of several concurrent callers for the same id, exactly one gets the
    /// ticket.
    pub fn take(&self, confirmation_id: &str) -> Option<BookedTicket> {
        let taken = self.inner.remove(confirmation_id).map(|(_, ticket)| ticket);
        if taken.is_some() {
            metrics::record_registry_size("tickets", self.inner.len());
        }
        taken
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

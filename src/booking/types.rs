//! Results of contract operations.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::blockchain::abi::ITicket;
use crate::blockchain::types::SubmittedTx;

/// Remaining seats per category, as reported by the flight contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatAvailability {
    pub economy: u64,
    pub premium_economy: u64,
    pub business: u64,
    pub first_class: u64,
}

impl SeatAvailability {
    /// Build from counts indexed by seat-class code 0..=3.
    pub fn from_counts(counts: [u64; 4]) -> Self {
        Self {
            economy: counts[0],
            premium_economy: counts[1],
            business: counts[2],
            first_class: counts[3],
        }
    }


    /// One-line summary, e.g. `Economy: 5| Premium Economy: 3| Business: 2| First class: 1`.
    pub fn summary(&self) -> String {
        format!(
            "Economy: {}| Premium Economy: {}| Business: {}| First class: {}",
            self.economy, self.premium_economy, self.business, self.first_class
        )
    }
}

/// Raw on-chain state of a flight contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightState {
    pub flight_number: String,
    /// Contract status code; see the configured flight statuses.
    pub status: u8,
    /// Unix seconds of the last status change.
    pub status_update_time: u64,
    /// Scheduled departure, unix seconds.
    pub flight_time: u64,
    pub model: String,
    pub seats: SeatAvailability,
}

/// Outcome of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSeat {
    pub confirmation_id: String,
    pub ticket_contract: Address,
    pub receipt: SubmittedTx,
}

/// Ticket status derived from the ticket contract's `cancelled` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Booked,
    Cancelled,
}

impl TicketStatus {
    pub fn from_cancelled(cancelled: bool) -> Self {
        if cancelled {
            TicketStatus::Cancelled
        } else {
            TicketStatus::Booked
        }
    }
}

/// Human-facing view of a booked ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    pub airline: String,
    pub booking_reference: String,
    pub status: TicketStatus,
    /// Seat category name.
    pub class: String,
}

/// State-changing calls a passenger or airline makes on a ticket contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Cancel,
    Claim,
    CollectMoney,
}

impl TicketAction {
    pub fn name(self) -> &'static str {
        match self {
            TicketAction::Cancel => "cancel",
            TicketAction::Claim => "claim",
            TicketAction::CollectMoney => "collect_money",
        }
    }

    pub fn calldata(self) -> Bytes {
        match self {
            TicketAction::Cancel => ITicket::cancelCall {}.abi_encode(),
            TicketAction::Claim => ITicket::claimCall {}.abi_encode(),
            TicketAction::CollectMoney => ITicket::collectMoneyCall {}.abi_encode(),
        }
        .into()
    }
}

//! Flight booking on top of the transaction pipeline.
//!
//! # Data Flow
//! ```text
//! FlightService operation
//!     → abi.rs (encode call / constructor)
//!     → TxBuilder (nonce, gas, sign, submit)   for writes
//!     → ChainRpc::call                          for views
//!     → types.rs (FlightState, BookedSeat, TicketDetails)
//! ```

pub mod operations;
pub mod schedule;
pub mod types;

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::LookupError;

pub use operations::FlightService;
pub use schedule::{from_unix_seconds, parse_flight_time, to_unix_seconds, ScheduleError};
pub use types::{BookedSeat, FlightState, SeatAvailability, TicketAction, TicketDetails, TicketStatus};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("No ticket contract issued for confirmation id '{0}'")]
    TicketNotIssued(String),
}

//! In-memory registries of deployed flights and booked tickets.
//!
//! Both registries are cheap to clone handles over a shared map and are
//! passed to handlers through application state.

pub mod flights;
pub mod locks;
pub mod tickets;

use thiserror::Error;

pub use flights::{DeployedFlight, FlightRegistry};
pub use locks::KeyedLocks;
pub use tickets::{BookedTicket, TicketRegistry};

/// Registry write conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Flight '{0}' is already deployed")]
    DuplicateFlight(String),
}

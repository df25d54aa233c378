//! HTTP surface of the bridge.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, trace span)
//!     → handlers.rs (decode body/query, registry + reference lookups)
//!     → booking::FlightService (chain operation)
//!     → error.rs (ApiError → status + body) on failure
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::{ApiError, TICKET_NOT_FOUND};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};

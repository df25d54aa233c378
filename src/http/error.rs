//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::booking::{BookingError, ScheduleError};
use crate::config::LookupError;
use crate::registry::RegistryError;

/// Body of every "ticket not found" response.
pub const TICKET_NOT_FOUND: &str = "Ticket not found";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Flight '{0}' not found")]
    FlightNotFound(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<BlockchainError> for ApiError {
    fn from(err: BlockchainError) -> Self {
        ApiError::Booking(BookingError::Chain(err))
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TicketNotFound | ApiError::FlightNotFound(_) | ApiError::Lookup(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Registry(RegistryError::DuplicateFlight(_)) => StatusCode::CONFLICT,
            ApiError::Booking(BookingError::Lookup(_))
            | ApiError::Booking(BookingError::TicketNotIssued(_)) => StatusCode::NOT_FOUND,
            ApiError::Booking(BookingError::Chain(chain)) => match chain {
                BlockchainError::Reverted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                BlockchainError::Wallet(_) => StatusCode::INTERNAL_SERVER_ERROR,
                BlockchainError::Rpc(_)
                | BlockchainError::Timeout(_)
                | BlockchainError::Abi(_)
                | BlockchainError::MissingEvent(_)
                | BlockchainError::ChainMismatch { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::TicketNotFound = self {
            return (status, TICKET_NOT_FOUND).into_response();
        }

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

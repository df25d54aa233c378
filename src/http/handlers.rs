//! Route handlers and their request/response bodies.

use alloy::primitives::{Address, TxHash, B256, U256};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::blockchain::{BlockchainError, SubmittedTx, Wallet};
use crate::booking::{from_unix_seconds, to_unix_seconds, SeatAvailability, TicketDetails};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::registry::{BookedTicket, DeployedFlight, RegistryError};

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub private_key: String,
    #[serde(default)]
    pub flight_number: String,
    /// Unix seconds.
    #[serde(default)]
    pub flight_time: u64,
    #[serde(default)]
    pub flight_model: String,
}

impl std::fmt::Debug for DeployRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployRequest")
            .field("private_key", &"<redacted>")
            .field("flight_number", &self.flight_number)
            .field("flight_time", &self.flight_time)
            .field("flight_model", &self.flight_model)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployFlightRequest {
    pub account: String,
    pub flight_number: String,
    /// Date string, e.g. `2030-01-01T10:00:00Z`.
    pub flight_time: String,
    pub flight_model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketRequest {
    pub account: String,
    pub flight_number: String,
    /// Seat category name within the flight's plane model.
    pub seat_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketResponse {
    pub confirmation_id: String,
    pub flight_contract: Address,
    pub ticket_contract: Address,
    pub transaction_hash: TxHash,
    pub block_hash: Option<B256>,
    pub status: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuery {
    pub flight_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadResponse {
    #[serde(rename = "flNum")]
    pub flight_number: String,
    #[serde(rename = "flStatus")]
    pub status: String,
    #[serde(rename = "flStatusUpdateTime")]
    pub status_update_time: String,
    #[serde(rename = "flightTime")]
    pub flight_time: String,
    #[serde(rename = "flightTimeRaw")]
    pub flight_time_raw: u64,
    #[serde(rename = "fModel")]
    pub model: String,
    #[serde(rename = "availableSeats")]
    pub available_seats: String,
    pub seats: SeatAvailability,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    pub account: String,
    pub confirmation_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTicketRequest {
    pub account: String,
    pub confirmation_id: String,
    /// Overrides the configured ticket gas limit.
    #[serde(default)]
    pub gas: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub chain_reachable: bool,
    pub flights: usize,
    pub tickets: usize,
}

/// Deploy a flight contract with a caller-supplied key. Not registered.
pub async fn deploy(
    State(state): State<AppState>,
    Json(req): Json<DeployRequest>,
) -> Result<Json<SubmittedTx>, ApiError> {
    let wallet = Wallet::from_private_key(&req.private_key, state.chain_id)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let receipt = state
        .service
        .deploy(&wallet, &req.flight_number, req.flight_time, &req.flight_model)
        .await?;
    Ok(Json(receipt))
}

/// Deploy a flight contract for a configured account and register it.
///
/// Deployment and registration run on their own task so a dropped request
/// cannot leave a mined contract unregistered.
pub async fn deploy_flight(
    State(state): State<AppState>,
    Json(req): Json<DeployFlightRequest>,
) -> Result<Json<SubmittedTx>, ApiError> {
    if req.flight_number.trim().is_empty() {
        return Err(ApiError::BadRequest("flightNumber must not be empty".to_string()));
    }
    let wallet = state.reference.wallet(&req.account)?.clone();
    state.reference.seat_categories(&req.flight_model)?;
    let scheduled_unix = to_unix_seconds(&req.flight_time)?;

    let receipt = tokio::spawn(deploy_and_register(state, wallet, req, scheduled_unix)).await??;
    Ok(Json(receipt))
}

async fn deploy_and_register(
    state: AppState,
    wallet: Wallet,
    req: DeployFlightRequest,
    scheduled_unix: u64,
) -> Result<SubmittedTx, ApiError> {
    let lock = state.flight_locks.lock_for(req.flight_number.clone());
    let _guard = lock.lock().await;

    if state.flights.contains(&req.flight_number) {
        return Err(RegistryError::DuplicateFlight(req.flight_number).into());
    }

    tracing::info!(
        account = %req.account,
        flight_number = %req.flight_number,
        scheduled_unix = scheduled_unix,
        model = %req.flight_model,
        "Deploying flight"
    );

    let receipt = state
        .service
        .deploy(&wallet, &req.flight_number, scheduled_unix, &req.flight_model)
        .await?;
    let contract_address = receipt.contract_address.ok_or_else(|| {
        BlockchainError::MissingEvent("deployment receipt has no contract address".to_string())
    })?;

    state.flights.register(DeployedFlight {
        flight_number: req.flight_number,
        scheduled_time: req.flight_time,
        scheduled_unix,
        model: req.flight_model,
        contract_address,
        block_hash: receipt.block_hash,
        status: receipt.status,
        transaction_hash: receipt.transaction_hash,
    })?;

    Ok(receipt)
}

/// Book a seat on a registered flight.
///
/// Runs on its own task, like [`deploy_flight`], so a paid ticket is always
/// recorded.
pub async fn book_ticket(
    State(state): State<AppState>,
    Json(req): Json<BookTicketRequest>,
) -> Result<Json<BookTicketResponse>, ApiError> {
    let wallet = state.reference.wallet(&req.account)?.clone();
    let flight = registered_flight(&state, &req.flight_number)?;
    let category = state.reference.seat_category(&flight.model, &req.seat_category)?;
    let cost = U256::from(category.cost);
    let seat_class = category.value;

    let booked = tokio::spawn(book_and_record(state, wallet, flight, seat_class, cost)).await??;
    Ok(Json(booked))
}

async fn book_and_record(
    state: AppState,
    wallet: Wallet,
    flight: DeployedFlight,
    seat_class: u8,
    cost: U256,
) -> Result<BookTicketResponse, ApiError> {
    let lock = state.flight_locks.lock_for(flight.flight_number.clone());
    let _guard = lock.lock().await;

    let booked = state
        .service
        .book_ticket(&wallet, flight.contract_address, seat_class, cost)
        .await?;

    state.tickets.insert(BookedTicket {
        confirmation_id: booked.confirmation_id.clone(),
        flight_number: flight.flight_number,
        flight_contract: flight.contract_address,
        ticket_contract: booked.ticket_contract,
    });

    Ok(BookTicketResponse {
        confirmation_id: booked.confirmation_id,
        flight_contract: flight.contract_address,
        ticket_contract: booked.ticket_contract,
        transaction_hash: booked.receipt.transaction_hash,
        block_hash: booked.receipt.block_hash,
        status: booked.receipt.status,
    })
}

/// Current state of a registered flight.
pub async fn read(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<ReadResponse>, ApiError> {
    let flight = registered_flight(&state, &query.flight_number)?;
    let on_chain = state.service.read(flight.contract_address).await?;
    let status = state.reference.flight_status(on_chain.status)?;

    Ok(Json(ReadResponse {
        flight_number: on_chain.flight_number,
        status: status.to_string(),
        status_update_time: rfc3339(on_chain.status_update_time)?,
        flight_time: rfc3339(on_chain.flight_time)?,
        flight_time_raw: on_chain.flight_time,
        model: on_chain.model,
        available_seats: on_chain.seats.summary(),
        seats: on_chain.seats,
    }))
}

/// Status and class of a booked ticket.
pub async fn ticket_details(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<TicketDetails>, ApiError> {
    let wallet = state.reference.wallet(&query.account)?;
    let ticket = state
        .tickets
        .get(&query.confirmation_id)
        .ok_or(ApiError::TicketNotFound)?;
    let flight = registered_flight(&state, &ticket.flight_number)?;
    let categories = state.reference.seat_categories(&flight.model)?;

    let details = state
        .service
        .ticket_details(
            wallet,
            ticket.flight_contract,
            &ticket.confirmation_id,
            Some(ticket.ticket_contract),
            &flight.model,
            categories,
        )
        .await?;
    Ok(Json(details))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    Json(req): Json<CancelTicketRequest>,
) -> Result<Json<SubmittedTx>, ApiError> {
    let (wallet, ticket) = claim_ticket(&state, &req.account, &req.confirmation_id)?;
    let receipt = state
        .service
        .cancel_ticket(wallet, ticket.flight_contract, &ticket.confirmation_id, req.gas)
        .await?;
    Ok(Json(receipt))
}

pub async fn claim(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<SubmittedTx>, ApiError> {
    let (wallet, ticket) = claim_ticket(&state, &query.account, &query.confirmation_id)?;
    let receipt = state
        .service
        .claim(wallet, ticket.flight_contract, &ticket.confirmation_id)
        .await?;
    Ok(Json(receipt))
}

pub async fn collect_money(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<SubmittedTx>, ApiError> {
    let (wallet, ticket) = claim_ticket(&state, &query.account, &query.confirmation_id)?;
    let receipt = state
        .service
        .collect_money(wallet, ticket.flight_contract, &ticket.confirmation_id)
        .await?;
    Ok(Json(receipt))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let chain_reachable = match state.service.chain().block_number().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Chain node unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if chain_reachable { "ok" } else { "degraded" }.to_string(),
        chain_reachable,
        flights: state.flights.len(),
        tickets: state.tickets.len(),
    })
}

fn registered_flight(state: &AppState, flight_number: &str) -> Result<DeployedFlight, ApiError> {
    state
        .flights
        .get(flight_number)
        .ok_or_else(|| ApiError::FlightNotFound(flight_number.to_string()))
}

/// Resolve the caller's wallet, then remove the ticket from the registry.
///
/// The ticket stays removed whatever the chain later answers.
fn claim_ticket<'a>(
    state: &'a AppState,
    account: &str,
    confirmation_id: &str,
) -> Result<(&'a Wallet, BookedTicket), ApiError> {
    let wallet = state.reference.wallet(account)?;
    let ticket = state
        .tickets
        .take(confirmation_id)
        .ok_or(ApiError::TicketNotFound)?;
    Ok((wallet, ticket))
}

fn rfc3339(seconds: u64) -> Result<String, ApiError> {
    from_unix_seconds(seconds)
        .map(|time| time.to_rfc3339())
        .ok_or_else(|| BlockchainError::Abi(format!("timestamp {} out of range", seconds)).into())
}

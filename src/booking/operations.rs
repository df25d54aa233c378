//! Contract operations against flight and ticket contracts.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use futures_util::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::blockchain::abi::{self, IFlight, ITicket};
use crate::blockchain::types::{BlockchainError, BlockchainResult, SubmittedTx};
use crate::blockchain::{ChainRpc, TxBuilder, TxIntent, Wallet};
use crate::booking::types::{
    BookedSeat, FlightState, SeatAvailability, TicketAction, TicketDetails, TicketStatus,
};
use crate::booking::BookingError;
use crate::config::reference::seat_class_by_value;
use crate::config::schema::{GasPolicy, SeatCategory};
use crate::observability::metrics;

/// Deploys flights and drives bookings through their contracts.
#[derive(Clone)]
pub struct FlightService {
    chain: Arc<dyn ChainRpc>,
    tx: TxBuilder,
    bytecode: Bytes,
    gas: GasPolicy,
}

impl FlightService {
    pub fn new(chain: Arc<dyn ChainRpc>, bytecode: Bytes, gas: GasPolicy) -> Self {
        Self {
            tx: TxBuilder::new(chain.clone()),
            chain,
            bytecode,
            gas,
        }
    }

    pub fn chain(&self) -> &Arc<dyn ChainRpc> {
        &self.chain
    }

    /// Create a flight contract. The receipt's contract address is the flight.
    pub async fn deploy(
        &self,
        wallet: &Wallet,
        flight_number: &str,
        scheduled_unix: u64,
        model: &str,
    ) -> Result<SubmittedTx, BookingError> {
        observe("deploy", async {
            let input = abi::deployment_input(&self.bytecode, flight_number, scheduled_unix, model);
            let receipt = self
                .tx
                .send(wallet, TxIntent::create(input, self.gas.deploy))
                .await?;

            if receipt.contract_address.is_none() {
                return Err(BlockchainError::MissingEvent(
                    "deployment receipt has no contract address".to_string(),
                )
                .into());
            }

            info!(
                flight_number = %flight_number,
                model = %model,
                contract = ?receipt.contract_address,
                tx_hash = %receipt.transaction_hash,
                "Flight contract deployed"
            );
            Ok(receipt)
        })
        .await
    }

    /// Book one seat of `seat_class`, paying `cost` wei.
    pub async fn book_ticket(
        &self,
        wallet: &Wallet,
        flight: Address,
        seat_class: u8,
        cost: U256,
    ) -> Result<BookedSeat, BookingError> {
        observe("book", async {
            let input = IFlight::bookSeatCall {
                category: seat_class,
            }
            .abi_encode();
            let intent = TxIntent::call(flight, input.into(), self.gas.book).with_value(cost);

            let receipt = self.tx.send(wallet, intent).await?;
            let (confirmation_id, ticket_contract) = abi::decode_booking_log(&receipt.logs)?;

            info!(
                flight = %flight,
                seat_class = seat_class,
                confirmation_id = %confirmation_id,
                ticket = %ticket_contract,
                "Seat booked"
            );
            Ok(BookedSeat {
                confirmation_id,
                ticket_contract,
                receipt,
            })
        })
        .await
    }

    /// Current state of a flight contract.
    pub async fn read(&self, flight: Address) -> Result<FlightState, BookingError> {
        observe("read", async {
            let (flight_number, status, status_update_time, flight_time, model) = tokio::try_join!(
                self.view(None, flight, IFlight::flightNumberCall {}),
                self.view(None, flight, IFlight::flightStatusCall {}),
                self.view(None, flight, IFlight::flightStatusUpdateTimeCall {}),
                self.view(None, flight, IFlight::flightTimeCall {}),
                self.view(None, flight, IFlight::modelCall {}),
            )?;

            let seats = try_join_all(
                (0..4u8).map(|category| self.view(None, flight, IFlight::seatsCall { category })),
            )
            .await?;
            let mut counts = [0u64; 4];
            for (slot, remaining) in counts.iter_mut().zip(seats) {
                *slot = remaining.saturating_to::<u64>();
            }

            Ok(FlightState {
                flight_number,
                status,
                status_update_time: status_update_time.saturating_to::<u64>(),
                flight_time: flight_time.saturating_to::<u64>(),
                model,
                seats: SeatAvailability::from_counts(counts),
            })
        })
        .await
    }

    /// Ticket contract the flight holds for a confirmation id.
    pub async fn ticket_contract(
        &self,
        from: Option<Address>,
        flight: Address,
        confirmation_id: &str,
    ) -> Result<Address, BookingError> {
        let ticket = self
            .view(
                from,
                flight,
                IFlight::getTicketFromIDCall {
                    confirmationId: confirmation_id.to_string(),
                },
            )
            .await?;

        if ticket.is_zero() {
            return Err(BookingError::TicketNotIssued(confirmation_id.to_string()));
        }
        Ok(ticket)
    }

    /// Status and class of a booked ticket.
    ///
    /// `hint` is the ticket address recorded at booking time; the flight
    /// contract's answer wins when they differ.
    pub async fn ticket_details(
        &self,
        wallet: &Wallet,
        flight: Address,
        confirmation_id: &str,
        hint: Option<Address>,
        model: &str,
        categories: &[SeatCategory],
    ) -> Result<TicketDetails, BookingError> {
        observe("ticket_details", async {
            let from = Some(wallet.address());
            let ticket = self.ticket_contract(from, flight, confirmation_id).await?;
            if let Some(recorded) = hint.filter(|recorded| *recorded != ticket) {
                debug!(
                    confirmation_id = %confirmation_id,
                    recorded = %recorded,
                    resolved = %ticket,
                    "Recorded ticket address is stale"
                );
            }

            let (cancelled, seat_class) = tokio::try_join!(
                self.view(from, ticket, ITicket::cancelledCall {}),
                self.view(from, ticket, ITicket::seatCategoryCall {}),
            )?;
            let class = seat_class_by_value(categories, model, seat_class)?;

            Ok(TicketDetails {
                airline: String::new(),
                booking_reference: confirmation_id.to_string(),
                status: TicketStatus::from_cancelled(cancelled),
                class: class.name.clone(),
            })
        })
        .await
    }

    /// Cancel a ticket. `gas_limit` replaces the configured ticket gas limit.
    pub async fn cancel_ticket(
        &self,
        wallet: &Wallet,
        flight: Address,
        confirmation_id: &str,
        gas_limit: Option<u64>,
    ) -> Result<SubmittedTx, BookingError> {
        self.ticket_action(TicketAction::Cancel, wallet, flight, confirmation_id, gas_limit)
            .await
    }

    pub async fn claim(
        &self,
        wallet: &Wallet,
        flight: Address,
        confirmation_id: &str,
    ) -> Result<SubmittedTx, BookingError> {
        self.ticket_action(TicketAction::Claim, wallet, flight, confirmation_id, None)
            .await
    }

    pub async fn collect_money(
        &self,
        wallet: &Wallet,
        flight: Address,
        confirmation_id: &str,
    ) -> Result<SubmittedTx, BookingError> {
        self.ticket_action(TicketAction::CollectMoney, wallet, flight, confirmation_id, None)
            .await
    }

    async fn ticket_action(
        &self,
        action: TicketAction,
        wallet: &Wallet,
        flight: Address,
        confirmation_id: &str,
        gas_limit: Option<u64>,
    ) -> Result<SubmittedTx, BookingError> {
        observe(action.name(), async {
            let ticket = self
                .ticket_contract(Some(wallet.address()), flight, confirmation_id)
                .await?;

            let mut gas = self.gas.ticket;
            if let Some(limit) = gas_limit {
                gas.gas_limit = limit;
            }

            let receipt = self
                .tx
                .send(wallet, TxIntent::call(ticket, action.calldata(), gas))
                .await?;

            info!(
                action = action.name(),
                confirmation_id = %confirmation_id,
                ticket = %ticket,
                tx_hash = %receipt.transaction_hash,
                "Ticket transaction confirmed"
            );
            Ok(receipt)
        })
        .await
    }

    /// Read-only call decoded into the function's return type.
    async fn view<C: SolCall>(
        &self,
        from: Option<Address>,
        to: Address,
        call: C,
    ) -> BlockchainResult<C::Return> {
        let output = self.chain.call(from, to, call.abi_encode().into()).await?;
        C::abi_decode_returns(&output)
            .map_err(|e| BlockchainError::Abi(format!("{}: {}", C::SIGNATURE, e)))
    }
}

impl std::fmt::Debug for FlightService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightService")
            .field("bytecode_len", &self.bytecode.len())
            .field("gas", &self.gas)
            .finish()
    }
}

/// Run one operation, recording its outcome and latency.
async fn observe<T, F>(operation: &'static str, fut: F) -> Result<T, BookingError>
where
    F: Future<Output = Result<T, BookingError>>,
{
    let start = Instant::now();
    let result = fut.await;
    metrics::record_operation(operation, result.is_ok(), start);
    if let Err(e) = &result {
        warn!(operation = operation, error = %e, "Contract operation failed");
    }
    result
}

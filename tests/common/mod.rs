//! Shared utilities for integration testing: an in-process chain and a
//! bridge bound to an ephemeral port.

#![allow(dead_code)]

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::{SolInterface, SolValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use flight_bridge::blockchain::abi::{IFlight, ITicket};
use flight_bridge::blockchain::{
    BlockchainError, BlockchainResult, ChainId, ChainRpc, ReceiptLog, SubmittedTx,
};
use flight_bridge::config::loader::parse_config;
use flight_bridge::http::AppState;
use flight_bridge::{BridgeConfig, HttpServer, Shutdown};

pub const CHAIN_ID: u64 = 1337;
pub const BYTECODE: [u8; 5] = [0x60, 0x80, 0x60, 0x40, 0x52];
pub const AIRLINE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const PASSENGER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const NODE_GAS_PRICE: u128 = 1_000;

/// Initial seats per category for flights of a plane model.
pub fn initial_seats(model: &str) -> [u64; 4] {
    match model {
        "A320" => [5, 3, 2, 1],
        "B737" => [2, 0, 1, 0],
        _ => [1, 1, 1, 1],
    }
}

pub fn test_config_toml() -> String {
    format!(
        r#"
        [listener]
        bind_address = "127.0.0.1:0"

        [contract]
        bytecode = "0x{bytecode}"

        [[accounts]]
        name = "airline"
        private_key = "{airline}"

        [[accounts]]
        name = "passenger"
        private_key = "0x{passenger}"

        [[plane_models]]
        code = "A320"

        [[plane_models.seat_categories]]
        name = "economy"
        value = 0
        cost = 100

        [[plane_models.seat_categories]]
        name = "premiumEconomy"
        value = 1
        cost = 200

        [[plane_models.seat_categories]]
        name = "business"
        value = 2
        cost = 300

        [[plane_models.seat_categories]]
        name = "firstClass"
        value = 3
        cost = 400

        [[plane_models]]
        code = "B737"

        [[plane_models.seat_categories]]
        name = "economy"
        value = 0
        cost = 150

        [[plane_models.seat_categories]]
        name = "business"
        value = 2
        cost = 350
        "#,
        bytecode = alloy::hex::encode(BYTECODE),
        airline = AIRLINE_KEY,
        passenger = PASSENGER_KEY,
    )
}

pub fn test_config() -> BridgeConfig {
    parse_config(&test_config_toml()).unwrap()
}

struct MockFlight {
    number: String,
    time: u64,
    model: String,
    status: u8,
    seats: [u64; 4],
    issued: u64,
    tickets: HashMap<String, Address>,
}

struct MockTicket {
    flight: Address,
    category: u8,
    cancelled: bool,
    claimed: bool,
    collected: bool,
}

#[derive(Default)]
struct MockState {
    nonces: HashMap<Address, u64>,
    flights: HashMap<Address, MockFlight>,
    tickets: HashMap<Address, MockTicket>,
    next_contract: u64,
    block: u64,
    submitted: Vec<TxEnvelope>,
}

impl MockState {
    fn new_contract(&mut self) -> Address {
        self.next_contract += 1;
        Address::left_padding_from(&(0xC0DE_0000 + self.next_contract).to_be_bytes())
    }
}

/// In-process chain that executes the flight and ticket contract interfaces.
///
/// Submitted transactions are decoded from their signed wire form, so the
/// bridge's encoding, signing and nonce handling are exercised end to end.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
    remote_calls: AtomicUsize,
    offline: AtomicBool,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every RPC made so far, reads included.
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Transactions accepted so far, in order.
    pub fn submitted(&self) -> Vec<TxEnvelope> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn ticket_flags(&self, ticket: Address) -> Option<(bool, bool, bool)> {
        let state = self.state.lock().unwrap();
        state
            .tickets
            .get(&ticket)
            .map(|t| (t.cancelled, t.claimed, t.collected))
    }

    pub fn set_flight_status(&self, flight: Address, status: u8) {
        if let Some(f) = self.state.lock().unwrap().flights.get_mut(&flight) {
            f.status = status;
        }
    }

    fn enter(&self) -> BlockchainResult<()> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }

    /// Apply a transaction. `Ok(None)` means it was mined but reverted.
    fn execute(
        state: &mut MockState,
        tx: &TxEnvelope,
    ) -> Result<Option<(Option<Address>, Vec<ReceiptLog>)>, BlockchainError> {
        let Some(to) = tx.to() else {
            let args = tx
                .input()
                .strip_prefix(BYTECODE.as_slice())
                .ok_or_else(|| BlockchainError::Rpc("unknown bytecode".to_string()))?;
            let (number, time, model) = <(String, U256, String)>::abi_decode_params(args)
                .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
            let address = state.new_contract();
            state.flights.insert(
                address,
                MockFlight {
                    seats: initial_seats(&model),
                    number,
                    time: time.to::<u64>(),
                    model,
                    status: 0,
                    issued: 0,
                    tickets: HashMap::new(),
                },
            );
            return Ok(Some((Some(address), vec![])));
        };

        if state.flights.contains_key(&to) {
            let IFlight::IFlightCalls::bookSeat(call) = IFlight::IFlightCalls::abi_decode(tx.input())
                .map_err(|e| BlockchainError::Rpc(e.to_string()))?
            else {
                return Ok(None);
            };
            let category = usize::from(call.category);
            let ticket = state.new_contract();
            let Some(flight) = state.flights.get_mut(&to) else {
                return Ok(None);
            };
            if category >= 4 || flight.seats[category] == 0 {
                return Ok(None);
            }
            flight.seats[category] -= 1;
            flight.issued += 1;
            let confirmation_id = format!("{}-{}", flight.number, flight.issued);
            flight.tickets.insert(confirmation_id.clone(), ticket);
            state.tickets.insert(
                ticket,
                MockTicket {
                    flight: to,
                    category: call.category,
                    cancelled: false,
                    claimed: false,
                    collected: false,
                },
            );
            let log = ReceiptLog {
                address: ticket,
                topics: vec![B256::repeat_byte(0xEE)],
                data: (confirmation_id,).abi_encode_params().into(),
            };
            return Ok(Some((None, vec![log])));
        }

        let Some(ticket) = state.tickets.get_mut(&to) else {
            return Ok(None);
        };
        let call = ITicket::ITicketCalls::abi_decode(tx.input())
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        match call {
            ITicket::ITicketCalls::cancel(_) => {
                if ticket.cancelled {
                    return Ok(None);
                }
                ticket.cancelled = true;
                let (flight, category) = (ticket.flight, usize::from(ticket.category));
                if let Some(flight) = state.flights.get_mut(&flight) {
                    flight.seats[category] += 1;
                }
            }
            ITicket::ITicketCalls::claim(_) => ticket.claimed = true,
            ITicket::ITicketCalls::collectMoney(_) => ticket.collected = true,
            _ => return Ok(None),
        }
        Ok(Some((None, vec![])))
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.enter()?;
        Ok(ChainId(CHAIN_ID))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.enter()?;
        Ok(self.state.lock().unwrap().block)
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.enter()?;
        Ok(*self.state.lock().unwrap().nonces.get(&address).unwrap_or(&0))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.enter()?;
        Ok(NODE_GAS_PRICE)
    }

    async fn call(&self, _from: Option<Address>, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.enter()?;
        let state = self.state.lock().unwrap();
        let revert = || BlockchainError::Rpc("execution reverted".to_string());

        if let Some(flight) = state.flights.get(&to) {
            let call = IFlight::IFlightCalls::abi_decode(&data).map_err(|_| revert())?;
            let output = match call {
                IFlight::IFlightCalls::flightNumber(_) => (flight.number.clone(),).abi_encode_params(),
                IFlight::IFlightCalls::flightStatus(_) => (U256::from(flight.status),).abi_encode_params(),
                IFlight::IFlightCalls::flightStatusUpdateTime(_) => {
                    (U256::from(flight.time - 3_600),).abi_encode_params()
                }
                IFlight::IFlightCalls::flightTime(_) => (U256::from(flight.time),).abi_encode_params(),
                IFlight::IFlightCalls::model(_) => (flight.model.clone(),).abi_encode_params(),
                IFlight::IFlightCalls::seats(call) => {
                    let remaining = flight
                        .seats
                        .get(usize::from(call.category))
                        .copied()
                        .ok_or_else(revert)?;
                    (U256::from(remaining),).abi_encode_params()
                }
                IFlight::IFlightCalls::getTicketFromID(call) => {
                    let ticket = flight
                        .tickets
                        .get(&call.confirmationId)
                        .copied()
                        .unwrap_or(Address::ZERO);
                    (ticket,).abi_encode_params()
                }
                IFlight::IFlightCalls::bookSeat(_) => return Err(revert()),
            };
            return Ok(output.into());
        }

        if let Some(ticket) = state.tickets.get(&to) {
            let output = match ITicket::ITicketCalls::abi_decode(&data).map_err(|_| revert())? {
                ITicket::ITicketCalls::cancelled(_) => (ticket.cancelled,).abi_encode_params(),
                ITicket::ITicketCalls::seatCategory(_) => (U256::from(ticket.category),).abi_encode_params(),
                _ => return Err(revert()),
            };
            return Ok(output.into());
        }

        Ok(Bytes::new())
    }

    async fn submit(&self, raw: Bytes) -> BlockchainResult<SubmittedTx> {
        self.enter()?;
        let tx = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| BlockchainError::Rpc(format!("invalid transaction: {}", e)))?;
        if tx.chain_id() != Some(CHAIN_ID) {
            return Err(BlockchainError::Rpc("invalid chain id".to_string()));
        }
        let sender = tx
            .recover_signer()
            .map_err(|e| BlockchainError::Rpc(format!("invalid signature: {}", e)))?;

        let mut state = self.state.lock().unwrap();
        let expected = *state.nonces.get(&sender).unwrap_or(&0);
        if tx.nonce() != expected {
            return Err(BlockchainError::Rpc(format!(
                "nonce mismatch: expected {}, got {}",
                expected,
                tx.nonce()
            )));
        }
        state.nonces.insert(sender, expected + 1);
        state.block += 1;
        let block = state.block;

        let outcome = Self::execute(&mut state, &tx)?;
        state.submitted.push(tx);

        let (status, contract_address, logs) = match outcome {
            Some((contract_address, logs)) => (true, contract_address, logs),
            None => (false, None, vec![]),
        };
        Ok(SubmittedTx {
            status,
            transaction_hash: keccak256(&raw),
            block_hash: Some(B256::from(U256::from(block))),
            block_number: Some(block),
            contract_address,
            gas_used: 21_000,
            logs,
        })
    }
}

/// Mines through a [`MockChain`], then holds the receipt back for a while.
pub struct SlowReceiptChain {
    inner: Arc<MockChain>,
    receipt_delay_ms: AtomicU64,
}

impl SlowReceiptChain {
    pub fn new(inner: Arc<MockChain>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            receipt_delay_ms: AtomicU64::new(0),
        })
    }

    pub fn set_receipt_delay(&self, delay: Duration) {
        self.receipt_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainRpc for SlowReceiptChain {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.inner.chain_id().await
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.inner.block_number().await
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.inner.pending_nonce(address).await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.inner.gas_price().await
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.inner.call(from, to, data).await
    }

    async fn submit(&self, raw: Bytes) -> BlockchainResult<SubmittedTx> {
        let receipt = self.inner.submit(raw).await?;
        let delay = self.receipt_delay_ms.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(receipt)
    }
}

/// A running bridge on an ephemeral port.
pub struct TestBridge {
    pub base_url: String,
    pub chain: Arc<MockChain>,
    pub state: AppState,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestBridge {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Deploy and register an A320 flight, returning its contract address.
    pub async fn deploy_flight(&self, flight_number: &str, model: &str) -> Address {
        let res = self
            .client
            .post(self.url("/deployFlight"))
            .json(&serde_json::json!({
                "account": "airline",
                "flightNumber": flight_number,
                "flightTime": "2030-01-01T10:00:00Z",
                "flightModel": model,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "deploy failed: {}", res.text().await.unwrap());
        self.state.flights.get(flight_number).unwrap().contract_address
    }

    pub async fn book(&self, flight_number: &str, seat_category: &str) -> reqwest::Response {
        self.client
            .post(self.url("/bookTicket"))
            .json(&serde_json::json!({
                "account": "passenger",
                "flightNumber": flight_number,
                "seatCategory": seat_category,
            }))
            .send()
            .await
            .unwrap()
    }

    pub async fn read(&self, flight_number: &str) -> serde_json::Value {
        let res = self
            .client
            .get(self.url("/read"))
            .query(&[("flightNumber", flight_number)])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        res.json().await.unwrap()
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_bridge() -> TestBridge {
    start_bridge_with(test_config()).await
}

pub async fn start_bridge_with(config: BridgeConfig) -> TestBridge {
    let chain = MockChain::new();
    start_bridge_on(config, chain.clone(), chain).await
}

/// Serve over `rpc`, keeping `chain` for inspection.
pub async fn start_bridge_on(
    config: BridgeConfig,
    rpc: Arc<dyn ChainRpc>,
    chain: Arc<MockChain>,
) -> TestBridge {
    let server = HttpServer::new(config, rpc).unwrap();
    let state = server.state().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestBridge {
        base_url: format!("http://{}", addr),
        chain,
        state,
        client,
        shutdown,
    }
}

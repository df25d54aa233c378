//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all booking routes
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Own the shared state handed to every handler
//! - Serve until the shutdown signal fires

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::{BlockchainError, ChainRpc};
use crate::booking::FlightService;
use crate::config::{contract_bytecode, BridgeConfig, ConfigError, ReferenceData};
use crate::http::handlers;
use crate::http::request::{make_span, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::registry::{FlightRegistry, KeyedLocks, TicketRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: FlightService,
    pub reference: Arc<ReferenceData>,
    pub flights: FlightRegistry,
    pub tickets: TicketRegistry,
    /// Serializes deployments and bookings per flight number.
    pub flight_locks: KeyedLocks<String>,
    pub chain_id: u64,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

/// HTTP server for the booking bridge.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: BridgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given chain connection.
    ///
    /// Fails when the contract bytecode cannot be loaded or an account key
    /// does not parse.
    pub fn new(config: BridgeConfig, chain: Arc<dyn ChainRpc>) -> Result<Self, ServerError> {
        let bytecode = contract_bytecode(&config.contract)?;
        let reference = Arc::new(ReferenceData::from_config(&config)?);

        let state = AppState {
            service: FlightService::new(chain, bytecode, config.gas.clone()),
            reference,
            flights: FlightRegistry::new(),
            tickets: TicketRegistry::new(),
            flight_locks: KeyedLocks::new(),
            chain_id: config.blockchain.chain_id,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/deploy", post(handlers::deploy))
            .route("/deployFlight", post(handlers::deploy_flight))
            .route("/bookTicket", post(handlers::book_ticket))
            .route("/read", get(handlers::read))
            .route("/ticketDetails", get(handlers::ticket_details))
            .route("/cancelTicket", post(handlers::cancel_ticket))
            .route("/claim", get(handlers::claim))
            .route("/collectMoney", get(handlers::collect_money))
            .route("/health", get(handlers::health))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            accounts = self.config.accounts.len(),
            plane_models = self.config.plane_models.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared state, for inspecting the registries.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BlockchainResult, ChainId, SubmittedTx};
    use crate::config::schema::AccountConfig;
    use alloy::primitives::{Address, Bytes};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// A node that never answers.
    struct DownChain;

    #[async_trait]
    impl ChainRpc for DownChain {
        async fn chain_id(&self) -> BlockchainResult<ChainId> {
            Err(BlockchainError::Rpc("down".into()))
        }
        async fn block_number(&self) -> BlockchainResult<u64> {
            Err(BlockchainError::Rpc("down".into()))
        }
        async fn pending_nonce(&self, _address: Address) -> BlockchainResult<u64> {
            Err(BlockchainError::Rpc("down".into()))
        }
        async fn gas_price(&self) -> BlockchainResult<u128> {
            Err(BlockchainError::Rpc("down".into()))
        }
        async fn call(&self, _from: Option<Address>, _to: Address, _data: Bytes) -> BlockchainResult<Bytes> {
            Err(BlockchainError::Rpc("down".into()))
        }
        async fn submit(&self, _raw: Bytes) -> BlockchainResult<SubmittedTx> {
            Err(BlockchainError::Rpc("down".into()))
        }
    }

    fn config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.contract.bytecode = Some("0x6080".to_string());
        config.accounts.push(AccountConfig {
            name: "airline".to_string(),
            private_key: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        });
        config
    }

    #[test]
    fn test_new_requires_bytecode() {
        let mut config = config();
        config.contract.bytecode = None;
        let result = HttpServer::new(config, Arc::new(DownChain));
        assert!(matches!(result, Err(ServerError::Config(ConfigError::Bytecode(_)))));
    }

    #[test]
    fn test_new_rejects_bad_account_key() {
        let mut config = config();
        config.accounts[0].private_key = "zz".to_string();
        let result = HttpServer::new(config, Arc::new(DownChain));
        assert!(matches!(result, Err(ServerError::Blockchain(BlockchainError::Wallet(_)))));
    }

    #[tokio::test]
    async fn test_health_degraded_with_request_id() {
        let server = HttpServer::new(config(), Arc::new(DownChain)).unwrap();
        let response = server
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let health: handlers::HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "degraded");
        assert!(!health.chain_reachable);
    }

    #[tokio::test]
    async fn test_unknown_account_is_rejected_without_chain() {
        let server = HttpServer::new(config(), Arc::new(DownChain)).unwrap();
        let request = Request::post("/bookTicket")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"account":"nobody","flightNumber":"AI1","seatCategory":"economy"}"#,
            ))
            .unwrap();
        let response = server.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

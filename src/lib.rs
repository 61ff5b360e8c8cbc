pub mod adapters;
pub mod banks;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod startup;
pub mod utils;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::health::DependencyChecker;
use crate::ports::TransactionRepository;
use crate::services::{ReconciliationService, WalletService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reconciliation: Arc<ReconciliationService>,
    pub wallet: Arc<WalletService>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub health: Arc<dyn DependencyChecker>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::webhook::bank_callback,
        handlers::transactions::get_transaction,
    ),
    components(schemas(
        handlers::HealthStatus,
        handlers::webhook::WebhookResponse,
        domain::Transaction,
        domain::TimelineEntry,
        domain::TransactionStatus,
        domain::TimelineStage,
    )),
    tags(
        (name = "Webhooks", description = "Bank callback reconciliation"),
        (name = "Transactions", description = "Transaction lookup"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.as_ref());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .route("/:bank_slug/callback", post(handlers::webhook::bank_callback))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}

/// CORS for the webhook surface, with the bank signature headers
/// allow-listed. Preflight OPTIONS is accepted; origins come from config.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-webhook-signature"),
            HeaderName::from_static("x-verify"),
            HeaderName::from_static("x-bank-signature"),
        ]);

    match &config.cors_allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
        None => layer.allow_origin(Any),
    }
}

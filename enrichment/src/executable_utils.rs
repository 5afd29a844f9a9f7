use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use common::config::{Config, ServerConfig};

use crate::{
    dataset::RecordStore,
    model::{EnrichRequest, GenericError, Service, SimpleEnrichRequest, ValidationError},
    normalize::{
        enrich_with_service, normalize_response, simple_ekata_response, simple_emailage_response,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, GenericError> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    println!("Loading config from: {}", args.config);
    let config = Config::load(&args.config)?;
    println!("Loaded config: {:#?}", config);

    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let level = log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

/// Build the full service router over the given record store.
pub fn app(store: Arc<dyn RecordStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/enrich", post(enrich))
        .route("/v1/enrich/emailage", post(enrich_emailage))
        .route("/v1/enrich/threatmetrix", post(enrich_threatmetrix))
        .route("/v1/enrich/ekata", post(enrich_ekata))
        .route("/v1/ekata", post(simple_ekata))
        .route("/v1/emailage", post(simple_emailage))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { store })
}

pub async fn run_server(
    config: ServerConfig,
    store: Arc<dyn RecordStore>,
) -> Result<(), GenericError> {
    let app = app(store);

    tracing::info!("Starting enrichment service at {}", config.address);
    let listener = tokio::net::TcpListener::bind(&config.address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "dataset_path": state.store.source(),
        "dataset_count": state.store.count(),
        "utc_now": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

async fn enrich(State(state): State<AppState>, Json(req): Json<EnrichRequest>) -> Response {
    if let Err(error) = req.validate() {
        return validation_failure(error);
    }

    let row = state.store.find(&req.transaction_id, &req.data.email);
    tracing::debug!(
        transaction_id = %req.transaction_id,
        dataset_hit = row.is_some(),
        "processing combined enrichment request"
    );

    Json(normalize_response(&req, row)).into_response()
}

async fn enrich_emailage(state: State<AppState>, req: Json<EnrichRequest>) -> Response {
    enrich_single(state, req, Service::Emailage)
}

async fn enrich_threatmetrix(state: State<AppState>, req: Json<EnrichRequest>) -> Response {
    enrich_single(state, req, Service::Threatmetrix)
}

async fn enrich_ekata(state: State<AppState>, req: Json<EnrichRequest>) -> Response {
    enrich_single(state, req, Service::Ekata)
}

fn enrich_single(
    State(state): State<AppState>,
    Json(req): Json<EnrichRequest>,
    service: Service,
) -> Response {
    if let Err(error) = req.validate() {
        return validation_failure(error);
    }

    let row = state.store.find(&req.transaction_id, &req.data.email);
    tracing::debug!(
        transaction_id = %req.transaction_id,
        service = %service,
        dataset_hit = row.is_some(),
        "processing single-service enrichment request"
    );

    Json(enrich_with_service(&req, row, service)).into_response()
}

async fn simple_ekata(
    State(state): State<AppState>,
    Json(req): Json<SimpleEnrichRequest>,
) -> Response {
    if let Err(error) = req.validate() {
        return validation_failure(error);
    }

    let row = state.store.find("", &req.email);
    Json(simple_ekata_response(&req, row)).into_response()
}

async fn simple_emailage(
    State(state): State<AppState>,
    Json(req): Json<SimpleEnrichRequest>,
) -> Response {
    if let Err(error) = req.validate() {
        return validation_failure(error);
    }

    let row = state.store.find("", &req.email);
    Json(simple_emailage_response(&req, row)).into_response()
}

fn validation_failure(error: ValidationError) -> Response {
    tracing::warn!(error = %error, "rejecting invalid enrichment request");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": error.to_string() })),
    )
        .into_response()
}

//! HTTP front end for the drug lookup.
//!
//! Routes:
//! - `POST /drug-info` with body `{"drug_name": "<name>"}`
//! - `GET /health` liveness probe

mod error;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::entities::lookup::{DrugInfoService, DrugReport, LookupOutcome};
pub use error::ApiError;

pub(crate) const BAD_REQUEST_MESSAGE: &str = "Please provide a drug name in JSON format.";

pub(crate) fn unknown_drug_message(name: &str) -> String {
    format!("Could not find RxCUI for {name}.")
}

pub(crate) fn no_data_message(name: &str) -> String {
    format!("No details found for {name}.")
}

/// Maps a lookup outcome onto the 200/404 responses of `POST /drug-info`.
pub(crate) fn outcome_to_result(name: &str, outcome: LookupOutcome) -> Result<DrugReport, ApiError> {
    match outcome {
        LookupOutcome::Found(report) => Ok(report),
        LookupOutcome::UnknownDrug => Err(ApiError::NotFound(unknown_drug_message(name))),
        LookupOutcome::NoData { .. } => Err(ApiError::NotFound(no_data_message(name))),
    }
}

/// Pulls a string `drug_name` out of a JSON object body.
fn requested_drug_name(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .as_object()?
        .get("drug_name")?
        .as_str()
        .map(str::to_string)
}

async fn drug_info(
    State(service): State<Arc<DrugInfoService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DrugReport>, ApiError> {
    let Some(name) = body.ok().and_then(|body| requested_drug_name(&body)) else {
        return Err(ApiError::BadRequest(BAD_REQUEST_MESSAGE.to_string()));
    };
    let outcome = service.lookup(&name).await;
    outcome_to_result(&name, outcome).map(Json)
}

#[derive(Debug, Serialize)]
struct Liveness {
    ok: bool,
    message: &'static str,
}

async fn health() -> Json<Liveness> {
    Json(Liveness {
        ok: true,
        message: "druginfo is alive",
    })
}

pub fn router(service: Arc<DrugInfoService>) -> Router {
    Router::new()
        .route("/drug-info", post(drug_info))
        .route("/health", get(health))
        .with_state(service)
        .layer(CorsLayer::permissive())
}

/// Serves the router on `host:port` until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the host is not an IP address or the bind fails.
pub async fn run(host: &str, port: u16, service: Arc<DrugInfoService>) -> anyhow::Result<()> {
    let ip: std::net::IpAddr = host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid host address: {e}"))?;
    let bind = std::net::SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server: {e}"))?;

    tracing::info!("druginfo HTTP server listening on http://{bind}");
    tracing::info!("  Lookup endpoint: POST http://{bind}/drug-info");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down…");
        })
        .await?;
    Ok(())
}

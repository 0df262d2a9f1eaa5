//! Detection HTTP server
//!
//! - `GET /` - health check, always `Ok`
//! - `POST /predict?imgName=<name>` - 200 summary JSON, 404 text when the
//!   run produced no label file, 400/500 `{"error": ...}` otherwise

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::error::PredictError;
use crate::service::{PredictionOutcome, PredictionService};

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    #[serde(rename = "imgName")]
    pub img_name: Option<String>,
}

pub fn create_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .with_state(service)
}

/// Serves `router` on `0.0.0.0:{port}` until the process stops
pub async fn run_server(port: u16, router: Router) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Starting detection server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn index() -> &'static str {
    "Ok"
}

async fn predict(
    State(service): State<Arc<PredictionService>>,
    Query(params): Query<PredictParams>,
) -> Result<Response, PredictError> {
    let img_name = params.img_name.unwrap_or_default();

    match service.predict(&img_name).await? {
        PredictionOutcome::Found(summary) => Ok(Json(summary).into_response()),
        PredictionOutcome::NotFound(message) => Ok((StatusCode::NOT_FOUND, message).into_response()),
    }
}

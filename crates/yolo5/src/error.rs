use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use polycore::StorageError;
use thiserror::Error;

use crate::inference::DetectError;
use crate::labels::LabelError;
use crate::store::StoreError;

/// Everything that can fail a `/predict` request
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid imgName: {0}")]
    BadRequest(String),

    #[error("Failed to download image: {0}")]
    Download(#[source] StorageError),

    #[error("Inference failed: {0}")]
    Inference(#[from] DetectError),

    #[error("Failed to upload predicted image: {0}")]
    Upload(#[source] StorageError),

    #[error("Failed to parse labels: {0}")]
    Labels(#[from] LabelError),

    #[error("Failed to store prediction summary: {0}")]
    Store(#[from] StoreError),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

//! HTTP client for the yolo5 detection service

use std::time::Duration;

use polycore::PredictionSummary;
use reqwest::{Client, StatusCode};

use crate::error::{GatewayError, GatewayResult};

#[derive(Clone, Debug)]
pub struct Yolo5Client {
    http: Client,
    base_url: String,
}

impl Yolo5Client {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Requests a prediction for an image already stored under `img_name`
    ///
    /// Single attempt. Any non-200 answer becomes
    /// [`GatewayError::Prediction`] carrying the response body.
    pub async fn predict(&self, img_name: &str) -> GatewayResult<PredictionSummary> {
        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .query(&[("imgName", img_name)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Yolo5 service answered {} for {}: {}", status, img_name, body);
            return Err(GatewayError::Prediction(body));
        }

        Ok(response.json::<PredictionSummary>().await?)
    }
}

/// Renders the chat reply listing every detected object
pub fn format_prediction(summary: &PredictionSummary) -> String {
    if summary.labels.is_empty() {
        return "No objects detected.".to_string();
    }

    let lines: Vec<String> = summary
        .labels
        .iter()
        .map(|label| {
            format!(
                "{} at ({:.2}, {:.2}) with size ({:.2}, {:.2})",
                label.class_name, label.cx, label.cy, label.width, label.height
            )
        })
        .collect();

    format!("Detected objects:\n{}", lines.join("\n"))
}

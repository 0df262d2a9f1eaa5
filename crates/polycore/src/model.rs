//! Prediction Summary document
//!
//! Built once per processed image by the detection service, inserted into
//! the document store, returned as the `/predict` response body and read back
//! by the chat gateway. JSON keys match the documents already stored by the
//! Python services (`class`, `original_img_path`, `time`, ...).

use serde::{Deserialize, Serialize};

/// A single detected object, normalized image coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "class")]
    pub class_name: String,
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

/// Summary of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub prediction_id: String,
    /// Blob key of the source image
    #[serde(rename = "original_img_path")]
    pub original_image: String,
    /// Blob key of the annotated image
    #[serde(rename = "predicted_img_path")]
    pub predicted_image: String,
    /// In label-file order
    pub labels: Vec<Label>,
    /// Creation time, UNIX seconds
    pub time: f64,
}

impl PredictionSummary {
    /// Assembles a summary stamped with the current time
    pub fn new(
        prediction_id: impl Into<String>,
        original_image: impl Into<String>,
        predicted_image: impl Into<String>,
        labels: Vec<Label>,
    ) -> Self {
        Self {
            prediction_id: prediction_id.into(),
            original_image: original_image.into(),
            predicted_image: predicted_image.into(),
            labels,
            time: unix_seconds_now(),
        }
    }
}

fn unix_seconds_now() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

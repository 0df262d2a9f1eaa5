//! Per-request prediction pipeline
//!
//! download → detect → upload annotated image → parse labels → store summary.
//! Each stage runs once; a failure ends the request with the stage's error
//! and nothing after it runs. An uploaded annotated image is not removed if a
//! later stage fails.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use polycore::{BlobStorage, PredictionSummary};
use uuid::Uuid;

use crate::classes::ClassTable;
use crate::config::KeyLayout;
use crate::error::PredictError;
use crate::inference::{DetectionRequest, Detector};
use crate::labels::read_labels;
use crate::store::SummaryStore;

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Found(PredictionSummary),
    /// The detector ran but left no label file; carries the 404 body
    NotFound(String),
}

/// Shared by every request; all fields are read-only handles
#[derive(Clone)]
pub struct PredictionService {
    storage: BlobStorage,
    detector: Arc<dyn Detector>,
    store: Arc<dyn SummaryStore>,
    classes: Arc<ClassTable>,
    download_dir: PathBuf,
    key_layout: KeyLayout,
}

impl PredictionService {
    pub fn new(
        storage: BlobStorage,
        detector: Arc<dyn Detector>,
        store: Arc<dyn SummaryStore>,
        classes: Arc<ClassTable>,
        download_dir: impl Into<PathBuf>,
        key_layout: KeyLayout,
    ) -> Self {
        Self {
            storage,
            detector,
            store,
            classes,
            download_dir: download_dir.into(),
            key_layout,
        }
    }

    pub async fn predict(&self, img_name: &str) -> Result<PredictionOutcome, PredictError> {
        validate_img_name(img_name)?;

        let prediction_id = Uuid::new_v4().to_string();
        let tag = format!("prediction: {}/{}", prediction_id, img_name);
        log::info!("{}. start processing", tag);

        // Per-prediction dir keeps concurrent requests for one image apart
        // while the basename still drives YOLOv5's output names.
        let original = self.download_dir.join(&prediction_id).join(img_name);
        self.storage
            .download_file(img_name, &original)
            .await
            .map_err(|e| {
                log::error!("{}. download failed: {}", tag, e);
                PredictError::Download(e)
            })?;
        log::info!("{}. download img completed", tag);

        let output = self
            .detector
            .detect(&DetectionRequest {
                source: original,
                run_name: prediction_id.clone(),
            })
            .await
            .map_err(|e| {
                log::error!("{}. inference failed: {}", tag, e);
                PredictError::Inference(e)
            })?;
        log::info!("{}. done", tag);

        let predicted_key = self.key_layout.predicted_key(&prediction_id, img_name);
        self.storage
            .upload_file(&output.annotated_image, &predicted_key)
            .await
            .map_err(|e| {
                log::error!("{}. upload failed: {}", tag, e);
                PredictError::Upload(e)
            })?;
        log::info!("{}. predicted image uploaded to {}", tag, predicted_key);

        if !label_file_exists(&output.labels_file).await {
            log::warn!("{}. no label file at {}", tag, output.labels_file.display());
            return Ok(PredictionOutcome::NotFound(format!(
                "{}. prediction result not found",
                tag
            )));
        }

        let labels = read_labels(&output.labels_file, &self.classes).await?;
        let summary = PredictionSummary::new(&prediction_id, img_name, predicted_key, labels);
        log::info!("{}. prediction summary: {} objects", tag, summary.labels.len());

        self.store.insert(&summary).await.map_err(|e| {
            log::error!("{}. store failed: {}", tag, e);
            PredictError::Store(e)
        })?;
        log::info!("{}. summary stored", tag);

        Ok(PredictionOutcome::Found(summary))
    }
}

async fn label_file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Rejects names that are missing or would escape the download directory
pub fn validate_img_name(img_name: &str) -> Result<(), PredictError> {
    if img_name.trim().is_empty() {
        return Err(PredictError::BadRequest("imgName is required".to_string()));
    }
    if img_name.contains('/') || img_name.contains('\\') || img_name.contains("..") {
        return Err(PredictError::BadRequest(format!(
            "'{}' must be a plain file name",
            img_name
        )));
    }
    Ok(())
}

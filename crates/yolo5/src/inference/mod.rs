//! Inference seam
//!
//! The service only needs two files back from a detector run: the annotated
//! image and the label file. [`Detector`] hides how they are produced;
//! [`Yolo5Detector`] shells out to YOLOv5's `detect.py`.

pub mod process;
pub mod yolov5;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use yolov5::Yolo5Detector;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("failed to start detector: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("detector timed out after {0}s")]
    Timeout(u64),

    #[error("detector exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One inference run
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    /// Local image to run on
    pub source: PathBuf,
    /// Run name; outputs are grouped under it
    pub run_name: String,
}

/// Where a run left its outputs
///
/// `labels_file` is where the label file belongs; it may not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutput {
    pub annotated_image: PathBuf,
    pub labels_file: PathBuf,
}

impl DetectionOutput {
    /// Output paths of a YOLOv5 run named `run_name` under `project_dir`
    ///
    /// `detect.py` writes `{project}/{name}/{file}` and
    /// `{project}/{name}/labels/{stem}.txt`.
    pub fn for_run(project_dir: &Path, run_name: &str, source: &Path) -> Self {
        let run_dir = project_dir.join(run_name);
        let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            annotated_image: run_dir.join(file_name),
            labels_file: run_dir.join("labels").join(format!("{}.txt", stem)),
        }
    }
}

#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionOutput, DetectError>;
}

//! YOLOv5 `detect.py` runner

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_with_timeout;
use super::{DetectError, DetectionOutput, DetectionRequest, Detector};
use crate::config::ServiceConfig;

/// Keep error bodies readable when YOLOv5 dumps a long traceback
const STDERR_TAIL_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct Yolo5Detector {
    python_bin: String,
    yolo_dir: PathBuf,
    weights: String,
    data_yaml: PathBuf,
    project_dir: PathBuf,
    timeout: Duration,
}

impl Yolo5Detector {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            yolo_dir: config.yolo_dir.clone(),
            weights: config.weights.clone(),
            data_yaml: config.data_yaml.clone(),
            project_dir: config.project_dir.clone(),
            timeout: config.inference_timeout(),
        }
    }

    /// `detect.py` runs inside `yolo_dir`, so every path handed to it must be absolute
    fn absolute(path: &Path) -> std::io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }

    fn args(&self, source: &Path, project: &Path, run_name: &str) -> Vec<String> {
        vec![
            "detect.py".to_string(),
            "--weights".to_string(),
            self.weights.clone(),
            "--data".to_string(),
            self.data_yaml.display().to_string(),
            "--source".to_string(),
            source.display().to_string(),
            "--project".to_string(),
            project.display().to_string(),
            "--name".to_string(),
            run_name.to_string(),
            "--save-txt".to_string(),
        ]
    }
}

#[async_trait]
impl Detector for Yolo5Detector {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionOutput, DetectError> {
        let source = Self::absolute(&request.source)?;
        let project = Self::absolute(&self.project_dir)?;
        let args = self.args(&source, &project, &request.run_name);

        log::info!("Running {} {} in {}", self.python_bin, args.join(" "), self.yolo_dir.display());

        let mut cmd = Command::new(&self.python_bin);
        cmd.args(&args).current_dir(&self.yolo_dir);
        let output = run_with_timeout(&mut cmd, self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .chars()
                .rev()
                .take(STDERR_TAIL_CHARS)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return Err(DetectError::Failed {
                status: output.status.to_string(),
                stderr: tail.trim().to_string(),
            });
        }

        let detection = DetectionOutput::for_run(&project, &request.run_name, &source);
        ensure_label_file(&detection).await?;
        Ok(detection)
    }
}

/// YOLOv5 writes no label file when it detects nothing. A successful run
/// that produced the annotated image gets an empty label file so that
/// "no label file" only ever means the pipeline broke.
pub async fn ensure_label_file(detection: &DetectionOutput) -> Result<(), DetectError> {
    let annotated = tokio::fs::try_exists(&detection.annotated_image).await?;
    let labels = tokio::fs::try_exists(&detection.labels_file).await?;

    if annotated && !labels {
        if let Some(dir) = detection.labels_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&detection.labels_file, b"").await?;
        log::info!("No detections, wrote empty {}", detection.labels_file.display());
    }
    Ok(())
}

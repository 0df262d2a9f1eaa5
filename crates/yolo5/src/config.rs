//! Detection service configuration
//!
//! Everything except the bucket has a default matching the stock YOLOv5
//! container layout (`detect.py`, `yolov5s.pt`, `data/coco128.yaml` in the
//! working directory).

use std::path::PathBuf;
use std::time::Duration;

use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;

const ENV_KEYS: &[&str] = &[
    "BUCKET_NAME",
    "PORT",
    "MONGO_URI",
    "MONGO_DB",
    "MONGO_COLLECTION",
    "YOLO_DIR",
    "PYTHON_BIN",
    "WEIGHTS",
    "DATA_YAML",
    "PROJECT_DIR",
    "DOWNLOAD_DIR",
    "INFERENCE_TIMEOUT_SECS",
    "KEY_LAYOUT",
    "LOG_FILE_PATH",
];

/// Where annotated images are written in the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyLayout {
    /// `predictions/{prediction_id}/{name}`
    #[default]
    PerPrediction,
    /// `predicted/{name}`
    Flat,
}

impl KeyLayout {
    pub fn predicted_key(self, prediction_id: &str, img_name: &str) -> String {
        match self {
            KeyLayout::PerPrediction => format!("predictions/{}/{}", prediction_id, img_name),
            KeyLayout::Flat => format!("predicted/{}", img_name),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub bucket_name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "default_mongo_db")]
    pub mongo_db: String,
    #[serde(default = "default_mongo_collection")]
    pub mongo_collection: String,
    /// YOLOv5 checkout containing `detect.py`
    #[serde(default = "default_yolo_dir")]
    pub yolo_dir: PathBuf,
    #[serde(default = "default_python_bin")]
    pub python_bin: String,
    #[serde(default = "default_weights")]
    pub weights: String,
    /// Dataset YAML holding the `names` class table
    #[serde(default = "default_data_yaml")]
    pub data_yaml: PathBuf,
    /// YOLOv5 `--project`; each run writes to `{project_dir}/{prediction_id}`
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,
    #[serde(default)]
    pub key_layout: KeyLayout,
    #[serde(default = "default_log_file_path")]
    pub log_file_path: String,
}

fn default_port() -> u16 {
    8081
}

fn default_mongo_uri() -> String {
    "mongodb://mongo1:27017/".to_string()
}

fn default_mongo_db() -> String {
    "yolo5".to_string()
}

fn default_mongo_collection() -> String {
    "predictions".to_string()
}

fn default_yolo_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_weights() -> String {
    "yolov5s.pt".to_string()
}

fn default_data_yaml() -> PathBuf {
    PathBuf::from("data/coco128.yaml")
}

fn default_project_dir() -> PathBuf {
    PathBuf::from("static/data")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_inference_timeout_secs() -> u64 {
    300
}

fn default_log_file_path() -> String {
    "yolo5.log".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::from_figment(Figment::new().merge(Env::raw().only(ENV_KEYS)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    /// Class table path; relative paths resolve against the YOLOv5 checkout
    pub fn data_yaml_path(&self) -> PathBuf {
        if self.data_yaml.is_absolute() {
            self.data_yaml.clone()
        } else {
            self.yolo_dir.join(&self.data_yaml)
        }
    }

    /// Non-secret settings for the startup banner (the Mongo URI may hold credentials)
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("bucket", self.bucket_name.clone()),
            ("port", self.port.to_string()),
            ("mongo", format!("{}.{}", self.mongo_db, self.mongo_collection)),
            ("yolo dir", self.yolo_dir.display().to_string()),
            ("weights", self.weights.clone()),
            ("data yaml", self.data_yaml_path().display().to_string()),
            ("key layout", format!("{:?}", self.key_layout)),
        ]
    }
}

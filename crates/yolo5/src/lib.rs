//! yolo5 - object-detection microservice
//!
//! `POST /predict?imgName=<name>` downloads the image from blob storage,
//! runs YOLOv5 on it, uploads the annotated image, parses the label file and
//! stores a Prediction Summary in MongoDB.
//!
//! # Module Structure
//!
//! - `config`: environment configuration
//! - `cli`: command-line interface
//! - `error`: request-level error type and its HTTP mapping
//! - `classes`: class-index → class-name table
//! - `labels`: YOLO label-file parser
//! - `inference`: the `Detector` seam and the YOLOv5 subprocess runner
//! - `store`: the `SummaryStore` seam and the MongoDB implementation
//! - `service`: the per-request prediction pipeline
//! - `server`: axum router

pub mod classes;
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod labels;
pub mod server;
pub mod service;
pub mod store;

pub use classes::ClassTable;
pub use config::ServiceConfig;
pub use error::PredictError;
pub use service::{PredictionOutcome, PredictionService};

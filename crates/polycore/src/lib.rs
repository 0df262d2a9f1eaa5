//! polycore - pieces shared by the chat gateway and the detection service
//!
//! # Module Structure
//!
//! - `model`: the Prediction Summary document exchanged over HTTP and stored in MongoDB
//! - `storage`: S3-compatible blob storage client
//! - `logging`: console + file logger setup
//! - `error`: storage error type

pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use error::StorageError;
pub use logging::init_logger;
pub use model::{Label, PredictionSummary};
pub use storage::BlobStorage;

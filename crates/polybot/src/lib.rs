//! polybot - Telegram front-end for the yolo5 object-detection service
//!
//! Receives webhook updates, relays photos to blob storage and the detection
//! service, and replies with the detected objects.
//!
//! # Module Structure
//!
//! - `config`: environment configuration, read once at startup
//! - `cli`: command-line interface
//! - `error`: gateway error type
//! - `telegram`: chat client, webhook registration and update types
//! - `detection`: HTTP client for the detection service
//! - `handlers`: message-handling strategies (echo, detect-and-relay)
//! - `server`: axum router for the webhook endpoint

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod handlers;
pub mod server;
pub mod telegram;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use handlers::{EchoHandler, MessageHandler, ObjectDetectionHandler};

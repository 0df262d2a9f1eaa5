//! Telegram integration
//!
//! - `types`: the subset of the Bot API update JSON the gateway reads
//! - `client`: the `ChatClient` seam and its teloxide implementation
//! - `webhook`: webhook registration at startup

pub mod client;
pub mod types;
pub mod webhook;

pub use client::{create_bot, ChatClient, TelegramClient};
pub use types::{Chat, IncomingMessage, PhotoSize, WebhookEvent};
pub use webhook::{delete_webhook, register_webhook};

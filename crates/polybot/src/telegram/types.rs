//! Webhook update payload
//!
//! Only the fields the gateway reads are modelled. Everything else in the
//! Bot API update is ignored, so new Telegram fields never break decoding.

use serde::Deserialize;

use crate::error::GatewayError;

/// Top-level webhook body
///
/// Updates without a `message` (edited messages, callback queries, ...)
/// decode with `message: None` and are acknowledged without a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i32,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    /// Size variants, smallest first as Telegram sends them
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl IncomingMessage {
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    pub fn is_photo(&self) -> bool {
        self.photo.as_ref().is_some_and(|sizes| !sizes.is_empty())
    }

    /// Highest-resolution variant (the last element Telegram sends)
    pub fn largest_photo(&self) -> Result<&PhotoSize, GatewayError> {
        self.photo
            .as_ref()
            .and_then(|sizes| sizes.last())
            .ok_or(GatewayError::NotAPhoto)
    }
}

//! Message-handling strategies
//!
//! The webhook hands every decoded message to one [`MessageHandler`].
//! [`EchoHandler`] replies with the text it received;
//! [`ObjectDetectionHandler`] runs photos through storage and detection and
//! falls back to an inner echo handler for everything else.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use polycore::BlobStorage;

use crate::detection::{format_prediction, Yolo5Client};
use crate::error::{GatewayError, GatewayResult};
use crate::telegram::{ChatClient, IncomingMessage};

pub const PHOTO_RECEIVED: &str = "Photo received. Processing...";
pub const PHOTO_UPLOADED: &str = "Photo uploaded to S3. Getting predictions...";

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, msg: &IncomingMessage) -> GatewayResult<()>;
}

/// Replies `"Your original message: {text}"`
#[derive(Clone)]
pub struct EchoHandler {
    chat: Arc<dyn ChatClient>,
}

impl EchoHandler {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn handle_message(&self, msg: &IncomingMessage) -> GatewayResult<()> {
        log::info!("Incoming message {} in chat {}", msg.message_id, msg.chat_id());

        match msg.text {
            Some(ref text) => {
                self.chat
                    .send_text(msg.chat_id(), &format!("Your original message: {}", text))
                    .await
            }
            None => {
                log::warn!(
                    "Message {} in chat {} has neither text nor photo, ignoring",
                    msg.message_id,
                    msg.chat_id()
                );
                Ok(())
            }
        }
    }
}

/// Detect-and-relay: photo → blob storage → yolo5 → chat reply
pub struct ObjectDetectionHandler {
    chat: Arc<dyn ChatClient>,
    storage: BlobStorage,
    yolo5: Yolo5Client,
    download_dir: PathBuf,
    fallback: EchoHandler,
}

impl ObjectDetectionHandler {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        storage: BlobStorage,
        yolo5: Yolo5Client,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fallback: EchoHandler::new(chat.clone()),
            chat,
            storage,
            yolo5,
            download_dir: download_dir.into(),
        }
    }

    /// Scratch dir for one message, so two copies of the same photo in flight
    /// never share a local file
    fn work_dir(&self, msg: &IncomingMessage) -> PathBuf {
        self.download_dir.join(format!("{}_{}", msg.chat_id(), msg.message_id))
    }

    /// Stores `photo_path` under its basename and returns the key
    async fn upload_photo(&self, photo_path: &Path) -> GatewayResult<String> {
        let photo_name = photo_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GatewayError::InvalidFileName(photo_path.display().to_string()))?
            .to_string();
        self.storage.upload_file(photo_path, &photo_name).await?;
        Ok(photo_name)
    }

    async fn process_photo(&self, msg: &IncomingMessage, work_dir: &Path) -> GatewayResult<()> {
        let chat_id = msg.chat_id();
        let photo = msg.largest_photo()?;

        let photo_path = self.chat.download_photo(&photo.file_id, work_dir).await?;
        self.chat.send_text(chat_id, PHOTO_RECEIVED).await?;

        let img_name = self.upload_photo(&photo_path).await?;
        self.chat.send_text(chat_id, PHOTO_UPLOADED).await?;

        let prediction = self.yolo5.predict(&img_name).await?;
        log::info!(
            "Prediction {} for {}: {} object(s)",
            prediction.prediction_id,
            img_name,
            prediction.labels.len()
        );

        self.chat.send_text(chat_id, &format_prediction(&prediction)).await
    }
}

#[async_trait]
impl MessageHandler for ObjectDetectionHandler {
    async fn handle_message(&self, msg: &IncomingMessage) -> GatewayResult<()> {
        if !msg.is_photo() {
            return self.fallback.handle_message(msg).await;
        }

        log::info!("Incoming photo message {} in chat {}", msg.message_id, msg.chat_id());

        let work_dir = self.work_dir(msg);
        let result = self.process_photo(msg, &work_dir).await;

        match tokio::fs::remove_dir_all(&work_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove temp dir {}: {}", work_dir.display(), e),
        }

        if let Err(e) = result {
            log::error!("Error handling message {}: {}", msg.message_id, e);
            self.chat.send_text(msg.chat_id(), &format!("Error: {}", e)).await?;
        }
        Ok(())
    }
}

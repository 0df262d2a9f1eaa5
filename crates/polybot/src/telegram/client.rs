//! Outbound chat operations
//!
//! Handlers talk to Telegram only through [`ChatClient`] so tests can swap
//! in a recording fake; [`TelegramClient`] is the teloxide-backed
//! production implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId, ReplyParameters};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> GatewayResult<()>;

    /// Sends `text` as a reply to `quoted_msg_id`
    async fn send_text_with_quote(&self, chat_id: i64, text: &str, quoted_msg_id: i32) -> GatewayResult<()>;

    /// Sends a local image; fails with [`GatewayError::MissingImage`] when the path is absent
    async fn send_photo(&self, chat_id: i64, img_path: &Path) -> GatewayResult<()>;

    /// Downloads a Telegram file into `dest_dir`, returning the local path
    ///
    /// The local file keeps the basename of Telegram's file path
    /// (`photos/file_12.jpg` lands at `dest_dir/file_12.jpg`).
    async fn download_photo(&self, file_id: &str, dest_dir: &Path) -> GatewayResult<PathBuf>;
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid `BOT_API_URL` or HTTP client build failure
pub fn create_bot(config: &GatewayConfig) -> anyhow::Result<Bot> {
    let client = reqwest::Client::builder().timeout(config.http_timeout()).build()?;
    let bot = Bot::with_client(config.telegram_token.clone(), client);

    let bot = if let Some(ref bot_api_url) = config.bot_api_url {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> GatewayResult<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_text_with_quote(&self, chat_id: i64, text: &str, quoted_msg_id: i32) -> GatewayResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_parameters(ReplyParameters::new(MessageId(quoted_msg_id)))
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, img_path: &Path) -> GatewayResult<()> {
        if !img_path.exists() {
            return Err(GatewayError::MissingImage);
        }
        self.bot
            .send_photo(ChatId(chat_id), InputFile::file(img_path.to_path_buf()))
            .await?;
        Ok(())
    }

    async fn download_photo(&self, file_id: &str, dest_dir: &Path) -> GatewayResult<PathBuf> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        log::info!("File info retrieved: path = {}, size = {} bytes", file.path, file.size);

        let file_name = Path::new(&file.path)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| format!("{}.jpg", file_id).into());
        let dest_path = dest_dir.join(file_name);

        tokio::fs::create_dir_all(dest_dir).await?;
        let mut dst = tokio::fs::File::create(&dest_path).await?;
        self.bot.download_file(&file.path, &mut dst).await?;

        log::info!("Photo {} saved to {}", file_id, dest_path.display());
        Ok(dest_path)
    }
}

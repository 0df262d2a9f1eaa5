use thiserror::Error;

/// Errors raised while handling a chat message
///
/// The detect-and-relay handler turns every variant into a single
/// `"Error: {message}"` chat reply; nothing escapes to the webhook caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Message dispatched to the photo path without a photo attachment
    #[error("Message content of type 'photo' expected")]
    NotAPhoto,

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Telegram file download errors
    #[error("Telegram download error: {0}")]
    TelegramDownload(#[from] teloxide::DownloadError),

    /// Blob storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] polycore::StorageError),

    /// Detection service answered with a non-200 status
    #[error("Failed to get prediction from Yolo5 service: {0}")]
    Prediction(String),

    /// HTTP transport or response decoding errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Downloaded file name cannot be used as a storage key
    #[error("Photo file name is not valid UTF-8: {0}")]
    InvalidFileName(String),

    /// Local path handed to `send_photo` does not exist
    #[error("Image path doesn't exist")]
    MissingImage,
}

/// Type alias for Result with GatewayError
pub type GatewayResult<T> = Result<T, GatewayError>;

use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

use polybot::cli::{Cli, Commands};
use polybot::detection::Yolo5Client;
use polybot::server::{create_router, run_server};
use polybot::telegram::{create_bot, delete_webhook, register_webhook, ChatClient, TelegramClient};
use polybot::{EchoHandler, GatewayConfig, MessageHandler, ObjectDetectionHandler};
use polycore::logging::log_startup;
use polycore::{init_logger, BlobStorage};

/// Entry point for the chat gateway
///
/// Configuration is read once; a missing variable aborts before any
/// network call is made.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let _ = dotenv();

    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logger(&config.log_file_path)?;
    log_startup("polybot", &config.summary());

    match cli.command {
        Some(Commands::Run {
            echo_only,
            skip_webhook,
        }) => run_gateway(config, echo_only, skip_webhook).await,
        Some(Commands::SetWebhook) => {
            let bot = create_bot(&config)?;
            register_webhook(&bot, config.webhook_url()?).await
        }
        Some(Commands::DeleteWebhook) => {
            let bot = create_bot(&config)?;
            delete_webhook(&bot).await
        }
        None => run_gateway(config, false, false).await,
    }
}

async fn run_gateway(config: GatewayConfig, echo_only: bool, skip_webhook: bool) -> Result<()> {
    let bot = create_bot(&config)?;

    if skip_webhook {
        log::info!("Leaving the registered webhook untouched");
    } else {
        register_webhook(&bot, config.webhook_url()?).await?;
    }

    let chat: Arc<dyn ChatClient> = Arc::new(TelegramClient::new(bot));

    let handler: Arc<dyn MessageHandler> = if echo_only {
        log::info!("Echo-only mode: photos are not sent for detection");
        Arc::new(EchoHandler::new(chat))
    } else {
        let storage = BlobStorage::s3_from_env(&config.bucket_name)?;
        let yolo5 = Yolo5Client::new(config.yolo5_service_url.clone(), config.http_timeout())?;
        Arc::new(ObjectDetectionHandler::new(chat, storage, yolo5, config.download_dir.clone()))
    };

    let router = create_router(handler, &config.webhook_path());
    run_server(config.port, router).await
}

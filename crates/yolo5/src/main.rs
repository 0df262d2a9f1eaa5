use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use polycore::logging::log_startup;
use polycore::{init_logger, BlobStorage};
use yolo5::cli::{Cli, Commands};
use yolo5::inference::{Detector, Yolo5Detector};
use yolo5::server::{create_router, run_server};
use yolo5::store::{MongoSummaryStore, SummaryStore};
use yolo5::{ClassTable, PredictionOutcome, PredictionService, ServiceConfig};

/// Entry point for the detection service
///
/// The class table, object store and Mongo client are built once here and
/// shared by every request.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let _ = dotenv();

    let config = ServiceConfig::from_env().context("Failed to load configuration")?;
    init_logger(&config.log_file_path)?;
    log_startup("yolo5", &config.summary());

    let service = Arc::new(build_service(&config).await?);

    match cli.command {
        Some(Commands::Predict { img_name }) => predict_once(&service, &img_name).await,
        Some(Commands::Run) | None => run_server(config.port, create_router(service)).await,
    }
}

async fn build_service(config: &ServiceConfig) -> Result<PredictionService> {
    let classes = ClassTable::load(&config.data_yaml_path())?;
    log::info!("Loaded {} class names", classes.len());

    let storage = BlobStorage::s3_from_env(&config.bucket_name)?;
    let store: Arc<dyn SummaryStore> =
        Arc::new(MongoSummaryStore::connect(&config.mongo_uri, &config.mongo_db, &config.mongo_collection).await?);
    let detector: Arc<dyn Detector> = Arc::new(Yolo5Detector::from_config(config));

    Ok(PredictionService::new(
        storage,
        detector,
        store,
        Arc::new(classes),
        config.download_dir.clone(),
        config.key_layout,
    ))
}

async fn predict_once(service: &PredictionService, img_name: &str) -> Result<()> {
    match service.predict(img_name).await? {
        PredictionOutcome::Found(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        PredictionOutcome::NotFound(message) => anyhow::bail!(message),
    }
}

//! Prediction Summary persistence
//!
//! Insert-only. The service never reads summaries back.

use async_trait::async_trait;
use mongodb::{Client, Collection};
use polycore::PredictionSummary;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn insert(&self, summary: &PredictionSummary) -> Result<(), StoreError>;
}

/// One MongoDB collection of Prediction Summaries
#[derive(Clone)]
pub struct MongoSummaryStore {
    collection: Collection<PredictionSummary>,
}

impl MongoSummaryStore {
    /// Builds the client; the driver connects lazily on first use
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        log::info!("MongoDB client ready for {}.{}", database, collection);

        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }
}

#[async_trait]
impl SummaryStore for MongoSummaryStore {
    async fn insert(&self, summary: &PredictionSummary) -> Result<(), StoreError> {
        let result = self.collection.insert_one(summary).await?;
        log::debug!("Inserted summary {} as {:?}", summary.prediction_id, result.inserted_id);
        Ok(())
    }
}

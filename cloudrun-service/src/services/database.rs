//! MongoDB-backed counter store.

use crate::models::{Counter, COUNTER_ID};
use crate::services::counter_store::CounterStore;
use async_trait::async_trait;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct CounterDb {
    client: MongoClient,
    db: Database,
}

impl CounterDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn counters(&self) -> Collection<Counter> {
        self.db.collection("counters")
    }
}

#[async_trait]
impl CounterStore for CounterDb {
    async fn read(&self) -> Result<i64, AppError> {
        let counter = self
            .counters()
            .find_one(doc! { "_id": COUNTER_ID }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read counter: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        Ok(counter.map(|c| c.count).unwrap_or(0))
    }

    async fn increment(&self) -> Result<i64, AppError> {
        let now = BsonDateTime::now();
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        // Single upsert so concurrent increments never read-then-write.
        let counter = self
            .counters()
            .find_one_and_update(
                doc! { "_id": COUNTER_ID },
                doc! {
                    "$inc": { "count": 1_i64 },
                    "$set": { "updated_at": now },
                    "$setOnInsert": { "created_at": now }
                },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to increment counter: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?
            .ok_or_else(|| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "upsert of counter {} returned no document",
                    COUNTER_ID
                ))
            })?;

        Ok(counter.count)
    }

    async fn clear(&self) -> Result<(), AppError> {
        let result = self
            .counters()
            .delete_one(doc! { "_id": COUNTER_ID }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete counter: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        if result.deleted_count == 0 {
            tracing::info!("Counter record does not exist, nothing to clear");
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}

use std::sync::Arc;

use singletable_core::entities::{HoldingMapper, HoldingRepository, JobMapper, JobRepository};
use singletable_core::jobs::{InMemoryJobQueue, JobQueue};
use singletable_core::storage::TableStore;

use crate::config::Config;
use crate::jobs::HttpJobQueue;

/// Application state shared across handlers.
///
/// One store handle is built at startup and shared by every repository.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub jobs: JobRepository,
    pub holdings: HoldingRepository,
    pub queue: Arc<dyn JobQueue>,
}

impl AppState {
    /// Wires repositories over `store` and hands submissions to `queue`.
    pub fn build(store: Arc<dyn TableStore>, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            jobs: JobRepository::new(store.clone(), JobMapper),
            holdings: HoldingRepository::new(store.clone(), HoldingMapper),
            store,
            queue,
        }
    }
}

/// The configured downstream queue, or an in-memory one when no URL is set.
fn job_queue(config: &Config) -> Result<Arc<dyn JobQueue>, anyhow::Error> {
    match &config.job_queue_url {
        Some(url) => {
            tracing::info!(%url, "Submitting jobs over HTTP");
            Ok(Arc::new(HttpJobQueue::new(
                url.clone(),
                config.job_queue_timeout(),
            )?))
        }
        None => {
            tracing::warn!("JOB_QUEUE_URL not set, jobs are queued in memory");
            Ok(Arc::new(InMemoryJobQueue::new()))
        }
    }
}

// ============================================================================
// Factory functions for each storage backend
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use singletable_core::storage::InMemoryStore;

    impl AppState {
        /// Creates AppState backed by an in-memory table.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            tracing::info!(table = %config.table_name, "Using in-memory storage");
            let store = Arc::new(InMemoryStore::new(config.table_name.clone()));
            Ok(Self::build(store, job_queue(config)?))
        }
    }
}

#[cfg(feature = "dynamodb")]
mod dynamodb {
    use super::*;
    use crate::storage::DynamoDbStore;

    impl AppState {
        /// Creates AppState backed by DynamoDB.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            tracing::info!(
                table = %config.table_name,
                endpoint = ?config.dynamodb_endpoint_url,
                "Using DynamoDB storage"
            );
            let store = Arc::new(
                DynamoDbStore::from_config(
                    config.table_name.clone(),
                    config.dynamodb_endpoint_url.as_deref(),
                )
                .await,
            );
            Ok(Self::build(store, job_queue(config)?))
        }
    }
}


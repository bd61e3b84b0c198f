use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    /// A caller-supplied write guard did not hold.
    #[error("{entity_type} condition failed: {id}")]
    ConditionFailed {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid entity data: {0}")]
    InvalidEntityData(String),
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Arc<StoreError>>,
    },
}

impl RepositoryError {
    /// Wraps a backend failure, keeping it as the error source.
    pub fn database(error: StoreError) -> Self {
        Self::Database {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Failures reported by a [`TableStore`](super::TableStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write's condition expression evaluated to false.
    #[error("conditional check failed")]
    ConditionalCheckFailed,
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
            source: None,
        }
    }

    pub fn backend_with_source<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Self::ConditionalCheckFailed)
    }
}

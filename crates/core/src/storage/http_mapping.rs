//! Pure functions for mapping repository errors to HTTP responses.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 400 (Bad Request)
/// - `InvalidEntityData` -> 400 (Bad Request)
/// - `ConditionFailed` -> 409 (Conflict)
/// - `Database` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use singletable_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Job",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 400,
        RepositoryError::InvalidEntityData(_) => 400,
        RepositoryError::ConditionFailed { .. } => 409,
        RepositoryError::Database { .. } => 500,
    }
}

/// Machine-readable error code for the JSON error body.
pub fn repository_error_code(error: &RepositoryError) -> &'static str {
    match error {
        RepositoryError::NotFound { .. } => "NOT_FOUND",
        RepositoryError::AlreadyExists { .. } => "ALREADY_EXISTS",
        RepositoryError::InvalidEntityData(_) => "INVALID_ENTITY_DATA",
        RepositoryError::ConditionFailed { .. } => "CONDITION_FAILED",
        RepositoryError::Database { .. } => "DATABASE_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Job",
            id: "job-123".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
        assert_eq!(repository_error_code(&error), "NOT_FOUND");
    }

    #[test]
    fn test_already_exists_maps_to_400() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Holding",
            id: "h-456".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_invalid_entity_data_maps_to_400() {
        let error = RepositoryError::InvalidEntityData("no attributes".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_condition_failed_maps_to_409() {
        let error = RepositoryError::ConditionFailed {
            entity_type: "Job",
            id: "job-1".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 409);
        assert_eq!(repository_error_code(&error), "CONDITION_FAILED");
    }

    #[test]
    fn test_database_maps_to_500() {
        let error = RepositoryError::database(StoreError::backend("Query", "throttled"));
        assert_eq!(repository_error_to_status_code(&error), 500);
    }
}

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use singletable_core::jobs::SubmitError;
use singletable_core::storage::{
    repository_error_code, repository_error_to_status_code, PaginationError, RepositoryError,
};

/// Handler error. Renders `{ "error": CODE, "message": ... }`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    fn status_and_code(&self) -> (u16, &'static str) {
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            (repository_error_to_status_code(err), repository_error_code(err))
        } else if let Some(err) = self.0.downcast_ref::<SubmitError>() {
            (err.status_code(), err.code())
        } else if self.0.downcast_ref::<PaginationError>().is_some() {
            (400, "INVALID_LIMIT")
        } else if self.0.is::<JsonRejection>()
            || self.0.is::<PathRejection>()
            || self.0.is::<QueryRejection>()
        {
            (400, "INVALID_REQUEST")
        } else {
            (500, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, error) = self.status_and_code();
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code = error, "Request failed");
        } else {
            tracing::warn!(error = %self.0, code = error, "Request rejected");
        }

        let body = ErrorBody {
            error,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use singletable_core::storage::StoreError;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_repository_errors_keep_their_status() {
        let not_found = AppError::from(RepositoryError::NotFound {
            entity_type: "Job",
            id: "1".to_string(),
        });
        assert_eq!(not_found.status_and_code(), (404, "NOT_FOUND"));

        let database = AppError::from(RepositoryError::database(StoreError::backend(
            "GetItem",
            "throttled",
        )));
        assert_eq!(database.status_and_code(), (500, "DATABASE_ERROR"));
    }

    #[test]
    fn test_submit_errors_use_their_codes() {
        let conflict = AppError::from(SubmitError::Conflict(Uuid::new_v4()));
        assert_eq!(conflict.status_and_code(), (409, "ALREADY_SUBMITTED"));
    }

    #[test]
    fn test_pagination_and_unknown_errors() {
        let limit = AppError::from(PaginationError::LimitOutOfRange(0));
        assert_eq!(limit.status_and_code(), (400, "INVALID_LIMIT"));

        let other = AppError(anyhow::anyhow!("boom"));
        assert_eq!(other.status_and_code(), (500, "INTERNAL_ERROR"));
    }
}

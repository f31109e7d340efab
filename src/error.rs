use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::dto::common::FlashMessage;
use crate::services::application_service::PipelineError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn store_status(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::UniqueViolation(_) => (StatusCode::CONFLICT, "Duplicate entry".to_string()),
        StoreError::Corrupt(_) | StoreError::Database(_) => {
            tracing::error!(error = %err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Store(err) => store_status(&err),
            Error::Pipeline(err) => {
                let status = match &err {
                    PipelineError::JobNotEligible
                    | PipelineError::InvalidStatus(_)
                    | PipelineError::MissingRejectionNote => StatusCode::BAD_REQUEST,
                    PipelineError::AlreadyApplied
                    | PipelineError::CannotWithdraw
                    | PipelineError::Withdrawn => StatusCode::CONFLICT,
                    PipelineError::NotOwner => StatusCode::FORBIDDEN,
                    PipelineError::ApplicationNotFound => StatusCode::NOT_FOUND,
                    PipelineError::Store(store_err) => {
                        let (status, message) = store_status(store_err);
                        return error_body(status, message, false);
                    }
                };
                let informational = matches!(err, PipelineError::AlreadyApplied);
                return error_body(status, err.to_string(), informational);
            }
            Error::Database(err) => {
                tracing::error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        error_body(status, error_message, false)
    }
}

fn error_body(status: StatusCode, message: String, informational: bool) -> axum::response::Response {
    let flash = if informational {
        FlashMessage::info(message.clone())
    } else {
        FlashMessage::danger(message.clone())
    };
    let body = Json(json!({ "error": message, "flash": flash }));
    (status, body).into_response()
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value as JsonValue;

    async fn render(err: Error) -> (StatusCode, JsonValue) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn already_applied_is_an_info_conflict() {
        let (status, body) = render(PipelineError::AlreadyApplied.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["flash"]["kind"], "info");
        assert_eq!(body["error"], "You have already applied to this job");
    }

    #[tokio::test]
    async fn pipeline_kinds_map_to_statuses() {
        let (status, body) = render(PipelineError::NotOwner.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["flash"]["kind"], "danger");
        let (status, _) = render(PipelineError::MissingRejectionNote.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = render(PipelineError::ApplicationNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() {
        let err = PipelineError::Store(StoreError::Corrupt("column status: bad".into()));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An unexpected error occurred");
    }
}

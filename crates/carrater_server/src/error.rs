use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carrater_core::db::DbError;
use carrater_core::RatingError;
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::Rating(err) => match err {
                RatingError::CatalogEmpty | RatingError::NotFound(_) => StatusCode::NOT_FOUND,
                RatingError::InvalidVoteType(_) => StatusCode::BAD_REQUEST,
                RatingError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RatingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(err) if err.is_contention() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Rating(err) => err.code(),
            Self::Database(err) if err.is_contention() => "storage_unavailable",
            Self::Database(_) => "storage_error",
            Self::Worker(_) | Self::Config(_) | Self::Logging(_) | Self::Io(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status=error error_code={} error={}",
                self.code(),
                self
            );
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;
    use carrater_core::{RatingError, RepoError};

    #[test]
    fn rating_errors_map_to_http_statuses() {
        let cases = [
            (RatingError::CatalogEmpty, StatusCode::NOT_FOUND),
            (RatingError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                RatingError::InvalidVoteType("sideways".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RatingError::StorageUnavailable("busy".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RatingError::Storage(RepoError::InvalidData("bad row".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn malformed_payload_is_a_client_error() {
        let err = AppError::MalformedPayload("missing field `car_id`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "malformed_payload");
    }
}

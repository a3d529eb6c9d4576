use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::dto::ErrorResponse;

/// Any failure coming out of the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("failed to check out a database connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("database query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] refinery::Error),
}

impl DataAccessError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

/// Error returned by a REST handler.
///
/// Every variant renders as `{"message": ..., "error": ...}` with a non-2xx
/// status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}: {error}")]
    InvalidRequest { message: String, error: String },

    #[error("{message}: {source}")]
    DataAccess {
        message: String,
        #[source]
        source: DataAccessError,
    },
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>, error: impl ToString) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            error: error.to_string(),
        }
    }

    /// Wraps a service failure, using `message` as the client-facing summary.
    pub fn from_service(message: impl Into<String>, err: ServiceError) -> Self {
        let message = message.into();
        match err {
            ServiceError::InvalidInput(reason) => Self::InvalidRequest {
                message,
                error: reason,
            },
            ServiceError::DataAccess(source) => Self::DataAccess { message, source },
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::DataAccess { source, .. } => source.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::InvalidRequest { message, error } => {
                tracing::warn!("rejected request: {message}: {error}");
                ErrorResponse { message, error }
            }
            Self::DataAccess { message, source } => {
                tracing::error!("{message}: {source}");
                ErrorResponse {
                    message,
                    error: source.to_string(),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_bad_request() {
        let err = ApiError::invalid_request("Failed to convert parameter", "not a number");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn closed_pool_maps_to_service_unavailable() {
        let err = ApiError::from_service(
            "Failed to get all notes",
            ServiceError::DataAccess(DataAccessError::Pool(deadpool_postgres::PoolError::Closed)),
        );
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_input_from_service_is_a_client_error() {
        let err = ApiError::from_service(
            "failed to add a new note",
            ServiceError::InvalidInput("author must not be empty".into()),
        );
        assert!(matches!(err, ApiError::InvalidRequest { ref error, .. } if error == "author must not be empty"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_body_carries_message_and_cause() {
        let resp = ApiError::invalid_request("Failed to convert parameter", "abc").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "Failed to convert parameter");
        assert_eq!(body.error, "abc");
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response envelope.
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidBody(message) | ApiError::Database(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Storage errors were already logged with their SQL state when converted
        match self {
            ApiError::InvalidBody(ref message) => {
                tracing::debug!("Rejected request body: {}", message);
            }
            ApiError::Database(ref message) => {
                tracing::debug!("Responding with storage failure: {}", message);
            }
        }

        let body = Json(json!({ "error": self.message() }));

        (self.status_code(), body).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidBody(err.to_string())
    }
}

// PostgreSQL error mapping. Every storage failure is a 500, the SQL state only feeds the log.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.code() {
            Some(code) => {
                tracing::error!("PostgreSQL error: {} (code: {})", err, code.code());
            }
            None if err.is_closed() => {
                tracing::error!("PostgreSQL connection closed: {}", err);
            }
            None => {
                tracing::error!("PostgreSQL client error: {}", err);
            }
        }

        ApiError::Database(err.to_string())
    }
}

// Connection pool error mapping
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                tracing::warn!("Database connection pool timeout: {}", err);
            }
            deadpool_postgres::PoolError::Closed => {
                tracing::error!("Database connection pool is closed: {}", err);
            }
            _ => {
                tracing::error!("Database connection pool error: {}", err);
            }
        }

        ApiError::Database(err.to_string())
    }
}

// Result type alias for convenience
pub type ApiResult<T> = Result<T, ApiError>;

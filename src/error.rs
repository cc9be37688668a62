use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Image generation blocked for {dish} (reason: {reason})")]
    GenerationBlocked { dish: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Search superseded by a newer request")]
    Superseded,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`AppError`], exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Upstream,
    GenerationBlocked,
    InvalidInput,
    Superseded,
    Storage,
    Internal,
}

/// Serializable error summary carried in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Upstream(_) | AppError::HttpClient(_) => ErrorKind::Upstream,
            AppError::GenerationBlocked { .. } => ErrorKind::GenerationBlocked,
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Superseded => ErrorKind::Superseded,
            AppError::Storage(_) | AppError::Cache(_) => ErrorKind::Storage,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn info(&self) -> ErrorInfo {
        let reason = match self {
            AppError::GenerationBlocked { reason, .. } => Some(reason.clone()),
            _ => None,
        };

        ErrorInfo {
            kind: self.kind(),
            message: self.to_string(),
            reason,
        }
    }
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Upstream | ErrorKind::GenerationBlocked => StatusCode::BAD_GATEWAY,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Superseded => StatusCode::CONFLICT,
            ErrorKind::Storage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let info = self.info();
        let status = info.kind.status_code();

        let body = Json(serde_json::json!({
            "error": info.message,
            "kind": info.kind,
            "reason": info.reason,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

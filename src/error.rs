//! Unified application error types
//!
//! Provides a single error type for the panel, returned from the
//! pagekite operations and rendered by the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::actions::ActionError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// External configuration tool failed
    #[error("Error setting/getting PageKite configuration - {0}")]
    Action(#[from] ActionError),

    /// File operation error
    #[error("文件操作错误: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded or saved
    #[error("配置错误: {0}")]
    Config(String),

    /// Rejected input
    #[error("校验失败: {0}")]
    Validation(String),

    /// Missing or wrong access token
    #[error("未授权访问")]
    Unauthorized,

    /// Cross-origin state-changing request
    #[error("拒绝跨站请求")]
    Forbidden,

    /// Internal error
    #[error("内部错误: {0}")]
    Internal(String),
}

/// Serializable error response for the JSON API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Error code for client-side handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::Action(_) => "ACTION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ErrorResponse::from(self).serialize(serializer)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

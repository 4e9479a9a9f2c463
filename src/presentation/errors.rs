// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::models::generation::GenerationError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 错误对应的 HTTP 状态码与对外消息
    pub fn classify(&self) -> (StatusCode, String) {
        if let Some(err) = self.0.downcast_ref::<GenerationError>() {
            return (status_for(err), err.public_message());
        }
        if let Some(err) = self.0.downcast_ref::<validator::ValidationErrors>() {
            return (StatusCode::BAD_REQUEST, format!("Invalid input: {}", err));
        }
        error!("Unhandled error: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}

/// 生成错误到 HTTP 状态码的映射
pub fn status_for(err: &GenerationError) -> StatusCode {
    match err {
        GenerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GenerationError::NotFound(_) => StatusCode::NOT_FOUND,
        GenerationError::Upstream {
            status: Some(status),
            ..
        } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        GenerationError::Upstream { status: None, .. } => StatusCode::BAD_GATEWAY,
        GenerationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Internal(_) | GenerationError::Cancelled => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
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

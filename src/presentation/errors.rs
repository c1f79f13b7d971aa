// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::dto::api_response::ApiResponseDto;
use crate::domain::models::task::TaskValidationError;
use crate::domain::services::presence_service::PresenceError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按具体错误类型选择状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<TaskValidationError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if self.0.downcast_ref::<PresenceError>().is_some() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.0);
        }

        let body = Json(ApiResponseDto::error(self.0.to_string()));
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

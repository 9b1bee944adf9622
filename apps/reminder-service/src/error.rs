//! # Reminder Service エラー定義
//!
//! Reminder Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスは常に `{ "success": false, "error": "..." }` の形式で、
//! スタックトレースなどの内部情報は含めない。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use billminder_infra::InfraError;
use billminder_shared::{FailureResponse, event_log::error as error_log};
use thiserror::Error;

/// Reminder Service で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// リマインダーストアから請求書を取得できない（判定パス全体を中断する）
    #[error("Failed to fetch reminders: {0}")]
    StoreUnavailable(#[from] InfraError),

    /// 不正なリクエスト、または単発送信の失敗
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::StoreUnavailable(e) => {
                tracing::error!(
                    error.category = error_log::category::INFRASTRUCTURE,
                    error.kind = error_log::kind::STORE_UNAVAILABLE,
                    span_trace = %e.span_trace(),
                    "リマインダーストアの取得に失敗: {}",
                    e
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(FailureResponse::new(self.to_string()))).into_response()
    }
}

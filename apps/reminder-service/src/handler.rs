//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数とルーターを定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、判定と送信はユースケース層に委譲
//!
//! ## CORS
//!
//! ブラウザから直接呼び出されるため、すべてのオリジンを許可する。
//! 許可ヘッダは `authorization, x-client-info, apikey, content-type`。
//! プリフライト（`OPTIONS`）は CORS レイヤーが応答する。

pub mod health;
pub mod reminder;

use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderName,
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
pub use health::health_check;
pub use reminder::{
    CheckRemindersResponse,
    EmailResultDto,
    ReminderState,
    SendReminderResponse,
    check_bill_reminders,
    send_bill_reminder,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// ルーターを構築する
pub fn router(state: Arc<ReminderState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/check-bill-reminders", post(check_bill_reminders))
        .route("/send-bill-reminder", post(send_bill_reminder))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

//! # ヘルスチェックハンドラ
//!
//! Reminder Service の稼働状態を確認するためのエンドポイント。
//!
//! ## エンドポイント
//!
//! ```text
//! GET /health
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0"
//! }
//! ```

use axum::Json;
use billminder_shared::HealthResponse;

/// ヘルスチェックエンドポイント
///
/// 依存先（ストア、メールプロバイダ）には問い合わせない。
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

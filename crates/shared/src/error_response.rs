//! # 失敗レスポンス
//!
//! 判定パス・送信パスの両エンドポイントで共通の失敗レスポンス `{ "success": false, "error": "..." }` を提供する。
//!
//! ## 設計
//!
//! - `FailureResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換と HTTP ステータスの決定は各サービスの責務
//! - スタックトレース等の内部情報は含めない

use serde::{Deserialize, Serialize};

/// 失敗レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    /// 常に `false`
    pub success: bool,
    /// 人が読めるエラーメッセージ
    pub error:   String,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error:   error.into(),
        }
    }
}

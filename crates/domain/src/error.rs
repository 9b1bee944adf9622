//! # ドメイン層エラー定義
//!
//! ビジネスルール違反や不正なレコードを表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **影響範囲の明示**: `MalformedRecord` は 1 件の請求書に閉じたエラーであり、
//!   判定パス全体を中断させない
//!
//! ## エラーの種類と扱い
//!
//! | エラー種別 | 影響範囲 | 扱い |
//! |-----------|---------|------|
//! | `Validation` | 設定値 | 起動時に失敗させる |
//! | `MalformedRecord` | 請求書 1 件 | 送信結果に `errored` として記録する |
//!
//! ## 使用例
//!
//! ```rust
//! use billminder_domain::DomainError;
//!
//! fn validate_interval(days: u32) -> Result<(), DomainError> {
//!     if days == 0 {
//!         return Err(DomainError::Validation(
//!             "エスカレーション間隔は 1 日以上である必要があります".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 設定値や入力値がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 不正なレコード
    ///
    /// ストアから受け取った請求書の `next_reminder_date` が日付として解釈できない場合。
    /// 「期日前」として黙って扱うことはせず、必ずこのエラーを返す。
    #[error("不正なレコードです（id={id}）: 日付 {value:?} を解釈できません")]
    MalformedRecord {
        /// 請求書リマインダーの ID
        id:    String,
        /// 解釈できなかった日付文字列
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_recordのメッセージにidと値が含まれる() {
        let error = DomainError::MalformedRecord {
            id:    "r-1".to_string(),
            value: "not-a-date".to_string(),
        };

        let message = error.to_string();

        assert!(message.contains("r-1"));
        assert!(message.contains("\"not-a-date\""));
    }
}

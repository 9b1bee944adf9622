//! # 請求書リマインダー
//!
//! 定期的な支払い（光熱費、サブスクリプション等）の次回リマインド日と完了状態を保持する。
//!
//! ## ライフサイクル
//!
//! 作成・完了の更新はストア側の責務であり、このクレートは読み取り専用で扱う。
//! 判定パスに渡されるのは `is_completed == false` のレコードのみ。
//!
//! ## 日付の扱い
//!
//! `next_reminder_date` はストアが返した文字列をそのまま保持する。
//! 日付としての解釈は [`crate::evaluation`] が行い、解釈できない場合は
//! [`DomainError::MalformedRecord`](crate::DomainError::MalformedRecord) になる。

use serde::{Deserialize, Serialize};

define_uuid_id! {
    /// 請求書リマインダー ID
    ///
    /// ストアの主キー。1 回の判定パスで同じ請求書に二重送信しないための識別に使う。
    pub struct BillReminderId;
}

/// 請求書リマインダー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillReminder {
    id:                 BillReminderId,
    description:        String,
    category:           String,
    amount:             Option<f64>,
    frequency:          String,
    next_reminder_date: String,
    is_completed:       bool,
}

impl BillReminder {
    /// ストアのレコードから請求書リマインダーを復元する
    pub fn new(
        id: BillReminderId,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: Option<f64>,
        frequency: impl Into<String>,
        next_reminder_date: impl Into<String>,
        is_completed: bool,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            category: category.into(),
            amount,
            frequency: frequency.into(),
            next_reminder_date: next_reminder_date.into(),
            is_completed,
        }
    }

    pub fn id(&self) -> &BillReminderId {
        &self.id
    }

    /// 人が読むためのラベル（例: "電気代"）
    pub fn description(&self) -> &str {
        &self.description
    }

    /// カテゴリタグ（例: "utilities"）
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    /// 繰り返し周期タグ（例: "monthly"）
    pub fn frequency(&self) -> &str {
        &self.frequency
    }

    /// ストアが返した次回リマインド日（未解釈の文字列）
    pub fn next_reminder_date(&self) -> &str {
        &self.next_reminder_date
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

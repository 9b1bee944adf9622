//! # 通知
//!
//! メール送信者に渡す通知ペイロードと送信エラーを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ReminderNotification`] | リマインダー通知 | 宛先・件名・構造化本文 `{to, subject, reminderData}` |
//! | [`ReminderData`] | リマインダー本文データ | テンプレートに渡す請求書情報 |
//! | [`SendReceipt`] | 送信受領 | プロバイダが返したメッセージ ID |
//! | [`NotificationError`] | 送信エラー | プロバイダの拒否と送信呼び出し自体の失敗を区別する |
//!
//! ## 設計方針
//!
//! - **境界契約の固定**: JSON のフィールド名は camelCase（`reminderData`, `nextReminderDate` 等）
//! - **失敗原因の区別**: `Rejected` は送信結果 `failed`、それ以外は `errored` に対応する

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bill_reminder::BillReminder, evaluation::Evaluation};

/// 通知送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// プロバイダが応答したが送信を拒否した
    ///
    /// メッセージはプロバイダのエラー詳細をそのまま保持する。
    #[error("{0}")]
    Rejected(String),

    /// 送信呼び出し自体が失敗した（ネットワーク、タイムアウト等）
    ///
    /// メッセージは送信者が組み立てた詳細をそのまま保持する。
    #[error("{0}")]
    Transport(String),

    /// 本文テンプレートのレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

impl NotificationError {
    /// プロバイダによる拒否か（送信結果 `failed` に対応）
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// リマインダー本文データ
///
/// 境界契約のフィールド名: `description`, `category`, `nextReminderDate`,
/// `amount`, `frequency`, `isOverdue`, `daysOverdue`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderData {
    pub description:        String,
    pub category:           String,
    pub next_reminder_date: String,
    #[serde(default)]
    pub amount:             Option<f64>,
    pub frequency:          String,
    #[serde(default)]
    pub is_overdue:         bool,
    #[serde(default)]
    pub days_overdue:       i64,
}

/// リマインダー通知（送信者に渡すペイロード）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotification {
    /// 送信先メールアドレス
    pub to:            String,
    /// 件名
    pub subject:       String,
    /// 構造化本文
    pub reminder_data: ReminderData,
}

impl ReminderNotification {
    /// 判定結果から通知ペイロードを組み立てる
    ///
    /// 件名は当日なら `Bill Reminder: {description}`、
    /// 延滞なら `Overdue Bill Reminder: {description} ({days} days overdue)`。
    pub fn build(
        recipient: impl Into<String>,
        bill: &BillReminder,
        evaluation: &Evaluation,
    ) -> Self {
        Self {
            to:            recipient.into(),
            subject:       subject_for(bill.description(), evaluation),
            reminder_data: ReminderData {
                description:        bill.description().to_string(),
                category:           bill.category().to_string(),
                next_reminder_date: bill.next_reminder_date().to_string(),
                amount:             bill.amount(),
                frequency:          bill.frequency().to_string(),
                is_overdue:         evaluation.is_overdue,
                days_overdue:       evaluation.days_diff,
            },
        }
    }
}

/// 判定結果に応じた件名を返す
pub fn subject_for(description: &str, evaluation: &Evaluation) -> String {
    if evaluation.is_overdue {
        format!(
            "Overdue Bill Reminder: {description} ({} days overdue)",
            evaluation.days_diff
        )
    } else {
        format!("Bill Reminder: {description}")
    }
}

/// 送信受領
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// プロバイダが採番したメッセージ ID（返さないプロバイダもある）
    pub email_id: Option<String>,
}

impl SendReceipt {
    pub fn with_id(email_id: impl Into<String>) -> Self {
        Self {
            email_id: Some(email_id.into()),
        }
    }
}

//! # 送信結果と集計レポート
//!
//! 1 回の判定パスで通知を試みた請求書ごとの結果（[`DispatchOutcome`]）と、
//! それらをまとめた [`AggregateReport`] を定義する。
//!
//! どちらも呼び出しごとに新しく生成され、永続化されない。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bill_reminder::BillReminderId;

/// 送信結果の種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DispatchStatus {
    /// 送信成功
    Sent,
    /// プロバイダが送信を拒否した
    Failed,
    /// 送信呼び出し自体の失敗、または不正なレコード
    Errored,
}

/// 1 件の請求書に対する送信結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub reminder_id:  BillReminderId,
    pub description:  String,
    pub status:       DispatchStatus,
    /// 通知時点の延滞日数（`sent` の場合のみ）
    pub days_overdue: Option<i64>,
    /// エラー詳細（`failed` / `errored` の場合のみ、原文のまま）
    pub error:        Option<String>,
    /// プロバイダのメッセージ ID（返された場合のみ）
    pub email_id:     Option<String>,
}

impl DispatchOutcome {
    pub fn sent(
        reminder_id: BillReminderId,
        description: impl Into<String>,
        days_overdue: i64,
        email_id: Option<String>,
    ) -> Self {
        Self {
            reminder_id,
            description: description.into(),
            status: DispatchStatus::Sent,
            days_overdue: Some(days_overdue),
            error: None,
            email_id,
        }
    }

    pub fn failed(
        reminder_id: BillReminderId,
        description: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            reminder_id,
            description: description.into(),
            status: DispatchStatus::Failed,
            days_overdue: None,
            error: Some(error.into()),
            email_id: None,
        }
    }

    pub fn errored(
        reminder_id: BillReminderId,
        description: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            reminder_id,
            description: description.into(),
            status: DispatchStatus::Errored,
            days_overdue: None,
            error: Some(error.into()),
            email_id: None,
        }
    }
}

/// 判定パスの集計レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// 判定した日付
    pub date:          NaiveDate,
    /// 判定対象になった未完了の請求書の件数
    pub total_checked: usize,
    /// 送信に成功した件数
    pub sent_count:    usize,
    /// 送信を試みた請求書ごとの結果（入力順）
    pub outcomes:      Vec<DispatchOutcome>,
}

impl AggregateReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_checked: 0,
            sent_count: 0,
            outcomes: Vec::new(),
        }
    }

    /// 送信結果を追加する
    ///
    /// `sent` の場合は送信成功件数も加算する。
    pub fn record(&mut self, outcome: DispatchOutcome) {
        if outcome.status == DispatchStatus::Sent {
            self.sent_count += 1;
        }
        self.outcomes.push(outcome);
    }

    /// 呼び出し元に返す要約メッセージ
    pub fn summary(&self) -> String {
        format!(
            "Checked {} reminders, sent {} emails",
            self.total_checked, self.sent_count
        )
    }

    pub fn count_by_status(&self, status: DispatchStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

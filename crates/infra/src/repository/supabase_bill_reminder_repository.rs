//! # Supabase 実装の BillReminderRepository
//!
//! Supabase の PostgREST API 経由で `bill_reminders` テーブルを読み取る。
//! 列名は Supabase 側のスキーマに合わせて camelCase（`nextReminderDate`, `isCompleted`）。
//!
//! ```text
//! GET {SUPABASE_URL}/rest/v1/bill_reminders?select=*&isCompleted=eq.false
//! apikey: {service_role_key}
//! Authorization: Bearer {service_role_key}
//! ```
//!
//! 行は 1 件ずつ変換する。欠損や型違いのある行があっても取得全体は失敗させず、
//! 期日を解釈できないレコードとして判定側に渡す（判定で `MalformedRecord` になる）。

use std::time::Duration;

use async_trait::async_trait;
use billminder_domain::bill_reminder::{BillReminder, BillReminderId};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::BillReminderRepository;
use crate::error::InfraError;

/// PostgREST が返す行
///
/// スキーマ上 NOT NULL でも `null` が返ることがあるため、すべて省略可能として受け取る。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupabaseBillReminderRow {
    #[serde(default)]
    id:                 Option<Uuid>,
    #[serde(default)]
    description:        Option<String>,
    #[serde(default)]
    category:           Option<String>,
    #[serde(default)]
    amount:             Option<f64>,
    #[serde(default)]
    frequency:          Option<String>,
    #[serde(default)]
    next_reminder_date: Option<String>,
    #[serde(default)]
    is_completed:       Option<bool>,
}

impl From<SupabaseBillReminderRow> for BillReminder {
    fn from(row: SupabaseBillReminderRow) -> Self {
        BillReminder::new(
            row.id.map_or_else(BillReminderId::new, BillReminderId::from_uuid),
            row.description.unwrap_or_default(),
            row.category.unwrap_or_default(),
            row.amount,
            row.frequency.unwrap_or_default(),
            row.next_reminder_date.unwrap_or_default(),
            row.is_completed.unwrap_or(false),
        )
    }
}

/// Supabase（PostgREST）実装の BillReminderRepository
#[derive(Debug, Clone)]
pub struct SupabaseBillReminderRepository {
    base_url:    String,
    service_key: String,
    client:      reqwest::Client,
}

impl SupabaseBillReminderRepository {
    /// 新しいリポジトリインスタンスを作成
    ///
    /// # 引数
    ///
    /// - `base_url`: Supabase プロジェクトの URL（例: `https://xxxx.supabase.co`）
    /// - `service_key`: service role キー
    /// - `timeout`: 1 リクエストあたりのタイムアウト
    pub fn new(
        base_url: &str,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            client,
        })
    }

    fn incomplete_url(&self) -> String {
        format!(
            "{}/rest/v1/bill_reminders?select=*&isCompleted=eq.false",
            self.base_url
        )
    }
}

#[async_trait]
impl BillReminderRepository for SupabaseBillReminderRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_incomplete(&self) -> Result<Vec<BillReminder>, InfraError> {
        let response = self
            .client
            .get(self.incomplete_url())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InfraError::upstream_status(status.as_u16(), body));
        }

        decode_rows(&body)
    }
}

/// PostgREST のレスポンスボディをドメインモデルに変換する
///
/// ボディが配列でない場合のみエラーにする。
fn decode_rows(body: &str) -> Result<Vec<BillReminder>, InfraError> {
    let rows: Vec<Value> = serde_json::from_str(body)?;
    Ok(rows.into_iter().map(decode_row).collect())
}

fn decode_row(value: Value) -> BillReminder {
    match serde_json::from_value::<SupabaseBillReminderRow>(value.clone()) {
        Ok(row) => row.into(),
        Err(e) => {
            tracing::warn!(error = %e, "請求書リマインダーの行を解釈できません");
            malformed_row(&value)
        }
    }
}

/// 解釈できない行を、期日に行の原文を持つレコードとして表す
fn malformed_row(value: &Value) -> BillReminder {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .map_or_else(BillReminderId::new, BillReminderId::from_uuid);

    BillReminder::new(
        id,
        text("description"),
        text("category"),
        None,
        text("frequency"),
        value.to_string(),
        false,
    )
}

//! # BillReminderRepository
//!
//! 未完了の請求書リマインダーを読み取るリポジトリ。
//!
//! ## 設計方針
//!
//! - **日付は文字列で受け取る**: `next_reminder_date::text` として取得し、
//!   解釈はドメイン層の期日判定に任せる（不正値を `MalformedRecord` として扱うため）
//! - **並び順の固定**: 送信結果の順序を再現可能にするため `created_at, id` 順で返す

use async_trait::async_trait;
use billminder_domain::bill_reminder::{BillReminder, BillReminderId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// リマインダーストアのトレイト
#[async_trait]
pub trait BillReminderRepository: Send + Sync {
    /// 未完了（`is_completed = false`）の請求書リマインダーをすべて取得する
    ///
    /// 取得できなかった場合はエラーを返す。部分的な結果は返さない。
    async fn find_incomplete(&self) -> Result<Vec<BillReminder>, InfraError>;
}

/// `bill_reminders` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct BillReminderRow {
    id:                 Uuid,
    description:        String,
    category:           String,
    amount:             Option<f64>,
    frequency:          String,
    next_reminder_date: String,
    is_completed:       bool,
}

impl From<BillReminderRow> for BillReminder {
    fn from(row: BillReminderRow) -> Self {
        BillReminder::new(
            BillReminderId::from_uuid(row.id),
            row.description,
            row.category,
            row.amount,
            row.frequency,
            row.next_reminder_date,
            row.is_completed,
        )
    }
}

/// PostgreSQL 実装の BillReminderRepository
#[derive(Debug, Clone)]
pub struct PostgresBillReminderRepository {
    pool: PgPool,
}

impl PostgresBillReminderRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillReminderRepository for PostgresBillReminderRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_incomplete(&self) -> Result<Vec<BillReminder>, InfraError> {
        let rows = sqlx::query_as::<_, BillReminderRow>(
            r#"
            SELECT
                id,
                description,
                category,
                amount,
                frequency,
                next_reminder_date::text AS next_reminder_date,
                is_completed
            FROM bill_reminders
            WHERE is_completed = false
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BillReminder::from).collect())
    }
}

//! # Billminder インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはリマインダーストアとメール送信者の抽象（トレイト）と、
//! その具体的な実装を提供する。外部システムの詳細をカプセル化し、
//! 判定ロジックをインフラの変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: PostgreSQL / Supabase（PostgREST）から未完了の請求書を読み取る
//! - **通知送信**: Resend / SMTP / SES / リレー / Noop でリマインダーメールを送信する
//!
//! ## 依存関係
//!
//! ```text
//! reminder-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use billminder_infra::{
//!     db,
//!     notification::{NoopNotificationSender, NotificationSender},
//!     repository::{BillReminderRepository, PostgresBillReminderRepository},
//! };
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/billminder").await?;
//!     let store = PostgresBillReminderRepository::new(pool);
//!     let bills = store.find_incomplete().await?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::InfraError;

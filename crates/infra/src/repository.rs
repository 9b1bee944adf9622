//! # リポジトリ実装
//!
//! リマインダーストアの抽象と具体的な実装を提供する。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: 判定パスが必要とするのは未完了の請求書一覧のみ
//! - **ストア切替**: PostgreSQL 直結と Supabase（PostgREST）の 2 実装を環境変数で選択
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod bill_reminder_repository;
pub mod supabase_bill_reminder_repository;

pub use bill_reminder_repository::{BillReminderRepository, PostgresBillReminderRepository};
pub use supabase_bill_reminder_repository::SupabaseBillReminderRepository;

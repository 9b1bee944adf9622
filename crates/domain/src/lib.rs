//! # Billminder ドメイン層
//!
//! 請求書リマインダーの判定ロジックとドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! このクレートは I/O を一切持たない純粋なモデル層として、以下を提供する:
//!
//! - **エンティティ**: ストアから読み取った請求書リマインダー（[`bill_reminder::BillReminder`]）
//! - **ドメインサービス**: 期日判定とエスカレーション周期（[`evaluation`]）
//! - **通知ペイロード**: メール送信者に渡す構造化データ（[`notification`]）
//! - **集計レポート**: 1 回の判定パスで生成される送信結果（[`dispatch`]）
//!
//! ## 依存関係の方向
//!
//! ```text
//! reminder-service → infra → domain
//!         ↘                    ↑
//!           ───────────────────
//! ```
//!
//! ドメイン層はインフラ層（DB、メールプロバイダ）には一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use billminder_domain::{
//!     bill_reminder::{BillReminder, BillReminderId},
//!     evaluation::{EscalationPolicy, evaluate},
//! };
//! use chrono::NaiveDate;
//!
//! let bill = BillReminder::new(
//!     BillReminderId::new(),
//!     "電気代",
//!     "utilities",
//!     Some(84.5),
//!     "monthly",
//!     "2024-03-01",
//!     false,
//! );
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//!
//! let evaluation = evaluate(&bill, today, &EscalationPolicy::default()).unwrap();
//! assert!(evaluation.should_notify);
//! ```

#[macro_use]
mod macros;

pub mod bill_reminder;
pub mod clock;
pub mod dispatch;
pub mod error;
pub mod evaluation;
pub mod notification;

pub use error::DomainError;

//! # Billminder 共有ユーティリティ
//!
//! このクレートは、Billminder プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain を除く infra, reminder-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（tracing 系は `observability` feature の背後）

pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use error_response::FailureResponse;
pub use health::HealthResponse;

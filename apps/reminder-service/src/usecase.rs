//! # ユースケース層
//!
//! ハンドラから呼び出されるアプリケーションロジックを定義する。
//! リマインダーストアとメール送信者はトレイト経由で受け取り、テストではモックに差し替える。

pub mod reminder;

pub use reminder::{DispatchConfig, ReminderCheckUseCase, ReminderDispatcher};

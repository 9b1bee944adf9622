//! # Reminder Service ライブラリ
//!
//! Reminder Service の設定、ユースケース、ハンドラを公開する。
//! 結合テストからルーターを組み立てられるようにするため、バイナリとは別に公開している。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;

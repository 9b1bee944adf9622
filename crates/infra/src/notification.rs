//! # 通知送信
//!
//! リマインダーメールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **5 つの実装**: Resend（本番）、SMTP（Mailpit 開発用）、SES、
//!   リレー（リモートの送信エンドポイントへ転送）、Noop（テスト用）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **失敗の区別**: プロバイダの拒否は `Rejected`、呼び出し自体の失敗は `Transport`

mod noop;
mod relay;
mod resend;
mod ses;
mod smtp;
mod template;

use async_trait::async_trait;
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};
pub use noop::NoopNotificationSender;
pub use relay::RelayNotificationSender;
pub use resend::{DEFAULT_RESEND_API_URL, ResendNotificationSender};
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;
pub use template::{TemplateRenderer, humanize_tag};

/// メール送信トレイト
///
/// 1 回の呼び出しで 1 通送信を試みる。リトライはしない。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// リマインダー通知を送信する
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError>;
}

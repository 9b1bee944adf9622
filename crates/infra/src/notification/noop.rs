//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発や通知無効化時に使用する。

use async_trait::async_trait;
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            days_overdue = notification.reminder_data.days_overdue,
            "Noop: メール送信をスキップ"
        );
        Ok(SendReceipt::default())
    }
}

//! # テスト用モック
//!
//! ユースケーステストやハンドラテストで使用するインメモリのストアと送信者。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! billminder-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use billminder_domain::{
    bill_reminder::BillReminder,
    notification::{NotificationError, ReminderNotification, SendReceipt},
};

use crate::{error::InfraError, notification::NotificationSender, repository::BillReminderRepository};

// ===== MockBillReminderRepository =====

#[derive(Clone, Default)]
pub struct MockBillReminderRepository {
    reminders: Arc<Mutex<Vec<BillReminder>>>,
    failure:   Arc<Mutex<Option<String>>>,
}

impl MockBillReminderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reminders(reminders: Vec<BillReminder>) -> Self {
        let repo = Self::new();
        *repo.reminders.lock().unwrap() = reminders;
        repo
    }

    /// 以降の取得を失敗させる
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }
}

#[async_trait]
impl BillReminderRepository for MockBillReminderRepository {
    async fn find_incomplete(&self) -> Result<Vec<BillReminder>, InfraError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(InfraError::unexpected(message));
        }

        Ok(self
            .reminders
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.is_completed())
            .cloned()
            .collect())
    }
}

// ===== MockNotificationSender =====

/// 説明文ごとに仕込む送信時の振る舞い
#[derive(Clone)]
enum Scripted {
    Reject(String),
    TransportError(String),
    Delay(Duration),
}

/// 送信内容を記録するモック送信者
///
/// 振る舞いは請求書の説明文（`reminderData.description`）で指定する。
/// 指定のない請求書は `mock-email-{n}` の ID で成功する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:     Arc<Mutex<Vec<ReminderNotification>>>,
    attempts: Arc<Mutex<Vec<ReminderNotification>>>,
    scripts:  Arc<Mutex<HashMap<String, Scripted>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した請求書の送信をプロバイダ拒否にする
    pub fn reject_for(&self, description: &str, message: impl Into<String>) {
        self.script(description, Scripted::Reject(message.into()));
    }

    /// 指定した請求書の送信を呼び出し失敗にする
    pub fn transport_error_for(&self, description: &str, message: impl Into<String>) {
        self.script(description, Scripted::TransportError(message.into()));
    }

    /// 指定した請求書の送信を遅延させる（タイムアウト検証用）
    pub fn delay_for(&self, description: &str, delay: Duration) {
        self.script(description, Scripted::Delay(delay));
    }

    /// 成功した送信
    pub fn sent(&self) -> Vec<ReminderNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// 成否にかかわらず試みた送信
    pub fn attempts(&self) -> Vec<ReminderNotification> {
        self.attempts.lock().unwrap().clone()
    }

    fn script(&self, description: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .insert(description.to_string(), scripted);
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        self.attempts.lock().unwrap().push(notification.clone());

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get(&notification.reminder_data.description)
            .cloned();

        match scripted {
            Some(Scripted::Reject(message)) => return Err(NotificationError::Rejected(message)),
            Some(Scripted::TransportError(message)) => {
                return Err(NotificationError::Transport(message));
            }
            Some(Scripted::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(notification.clone());
        Ok(SendReceipt::with_id(format!("mock-email-{}", sent.len())))
    }
}

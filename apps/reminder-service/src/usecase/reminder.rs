//! # リマインダー判定・送信ユースケース
//!
//! 未完了の請求書を取得し、期日判定を行い、通知が必要な請求書ごとに
//! 1 通ずつメールを送信して結果を集計する。
//!
//! ## 設計方針
//!
//! - **逐次送信**: 請求書は入力順に 1 件ずつ処理し、結果の順序を入力順に保つ
//! - **請求書単位の隔離**: 1 件の失敗（不正レコード、送信拒否、送信失敗）は
//!   結果に記録するだけで、残りの請求書の処理を止めない
//! - **送信タイムアウト**: 送信呼び出しは `tokio::time::timeout` で上限を設け、
//!   超過は `errored` として扱う
//! - **重複送信の防止**: 同じ ID の請求書は 1 回の判定パスで 1 度しか扱わない
//! - **ストア障害のみ致命的**: 取得に失敗した場合は判定パス全体を中断する

use std::{collections::HashSet, sync::Arc, time::Duration};

use billminder_domain::{
    bill_reminder::BillReminder,
    clock::Clock,
    dispatch::{AggregateReport, DispatchOutcome, DispatchStatus},
    evaluation::{EscalationPolicy, evaluate},
    notification::{NotificationError, ReminderNotification, SendReceipt},
};
use billminder_infra::{notification::NotificationSender, repository::BillReminderRepository};
use billminder_shared::{
    event_log::{error as error_log, event},
    log_business_event,
};
use chrono::NaiveDate;

use crate::error::ServiceError;

/// 判定パスの設定
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// 送信先メールアドレス
    pub recipient:    String,
    /// 延滞時の再送周期
    pub policy:       EscalationPolicy,
    /// 1 通あたりの送信タイムアウト
    pub send_timeout: Duration,
}

/// 通知ディスパッチャ
///
/// 期日判定の結果に基づいてメール送信者を呼び出し、請求書ごとの送信結果を集計する。
pub struct ReminderDispatcher {
    sender: Arc<dyn NotificationSender>,
    config: DispatchConfig,
}

impl ReminderDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>, config: DispatchConfig) -> Self {
        Self { sender, config }
    }

    /// 請求書の一覧を判定し、必要な通知を送信する
    ///
    /// 完了済みの請求書は判定せず、件数にも含めない。
    /// このメソッドはエラーを返さない。請求書単位の失敗はすべて結果に記録される。
    pub async fn dispatch(&self, bills: &[BillReminder], today: NaiveDate) -> AggregateReport {
        let mut report = AggregateReport::new(today);
        let mut seen = HashSet::new();

        for bill in bills {
            if bill.is_completed() {
                continue;
            }
            if !seen.insert(*bill.id()) {
                tracing::warn!(
                    reminder.id = %bill.id(),
                    "同じ ID の請求書が重複しているためスキップ"
                );
                continue;
            }
            report.total_checked += 1;

            if let Some(outcome) = self.process(bill, today).await {
                report.record(outcome);
            }
        }

        log_business_event!(
            event.category = event::category::REMINDER,
            event.action = event::action::REMINDERS_CHECKED,
            event.result = event::result::SUCCESS,
            reminder.date = %today,
            reminder.total_checked = report.total_checked,
            reminder.sent_count = report.sent_count,
            reminder.failed_count = report.count_by_status(DispatchStatus::Failed),
            reminder.errored_count = report.count_by_status(DispatchStatus::Errored),
            "リマインダー判定完了"
        );

        report
    }

    /// 1 件の請求書を判定し、必要なら送信する
    ///
    /// 通知不要の場合は `None` を返す。
    async fn process(&self, bill: &BillReminder, today: NaiveDate) -> Option<DispatchOutcome> {
        let evaluation = match evaluate(bill, today, &self.config.policy) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                tracing::warn!(
                    error.category = error_log::category::DATA,
                    error.kind = error_log::kind::MALFORMED_RECORD,
                    reminder.id = %bill.id(),
                    error = %e,
                    "請求書の期日を解釈できない"
                );
                return Some(DispatchOutcome::errored(
                    *bill.id(),
                    bill.description(),
                    e.to_string(),
                ));
            }
        };

        tracing::debug!(
            reminder.id = %bill.id(),
            reminder.days_diff = evaluation.days_diff,
            reminder.state = ?evaluation.state(),
            reminder.should_notify = evaluation.should_notify,
            "期日判定"
        );

        if !evaluation.should_notify {
            return None;
        }

        let notification = ReminderNotification::build(&self.config.recipient, bill, &evaluation);

        let outcome = match self.send(&notification).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::BILL_REMINDER,
                    event.entity_id = %bill.id(),
                    event.result = event::result::SUCCESS,
                    reminder.days_overdue = evaluation.days_diff,
                    notification.email_id = receipt.email_id.as_deref().unwrap_or(""),
                    "リマインダーメール送信成功"
                );
                DispatchOutcome::sent(
                    *bill.id(),
                    bill.description(),
                    evaluation.days_diff,
                    receipt.email_id,
                )
            }
            Err(e) if e.is_rejection() => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::BILL_REMINDER,
                    event.entity_id = %bill.id(),
                    event.result = event::result::FAILURE,
                    error.category = error_log::category::EXTERNAL_SERVICE,
                    error.kind = error_log::kind::SEND_REJECTED,
                    error = %e,
                    "リマインダーメールが拒否された"
                );
                DispatchOutcome::failed(*bill.id(), bill.description(), e.to_string())
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_ERRORED,
                    event.entity_type = event::entity_type::BILL_REMINDER,
                    event.entity_id = %bill.id(),
                    event.result = event::result::FAILURE,
                    error.category = error_log::category::EXTERNAL_SERVICE,
                    error.kind = error_log::kind::SEND_TRANSPORT,
                    error = %e,
                    "リマインダーメールの送信呼び出しに失敗"
                );
                DispatchOutcome::errored(*bill.id(), bill.description(), e.to_string())
            }
        };

        Some(outcome)
    }

    /// 通知を 1 通送信する（タイムアウト付き）
    ///
    /// タイムアウトは [`NotificationError::Transport`] として返す。
    pub async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        let timeout = self.config.send_timeout;
        match tokio::time::timeout(timeout, self.sender.send(notification)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Transport(format!(
                "送信がタイムアウトしました（{}秒）",
                timeout.as_secs_f64()
            ))),
        }
    }
}

/// リマインダー判定ユースケース
///
/// ストアからの取得 → 期日判定 → 送信 → 集計を 1 回の呼び出しで行う。
pub struct ReminderCheckUseCase {
    store:      Arc<dyn BillReminderRepository>,
    clock:      Arc<dyn Clock>,
    dispatcher: ReminderDispatcher,
}

impl ReminderCheckUseCase {
    pub fn new(
        store: Arc<dyn BillReminderRepository>,
        clock: Arc<dyn Clock>,
        dispatcher: ReminderDispatcher,
    ) -> Self {
        Self {
            store,
            clock,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &ReminderDispatcher {
        &self.dispatcher
    }

    /// 判定パスを実行する
    ///
    /// # Errors
    ///
    /// ストアからの取得に失敗した場合は [`ServiceError::StoreUnavailable`] を返す。
    /// 部分的な結果は返さない。
    #[tracing::instrument(skip_all)]
    pub async fn check_reminders(&self) -> Result<AggregateReport, ServiceError> {
        let bills = self.store.find_incomplete().await?;
        let today = self.clock.today();

        tracing::info!(
            reminder.date = %today,
            reminder.fetched = bills.len(),
            "未完了の請求書を取得"
        );

        Ok(self.dispatcher.dispatch(&bills, today).await)
    }
}

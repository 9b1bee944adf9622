//! # リマインダーハンドラ
//!
//! 判定パスと単発送信のエンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! - `POST /check-bill-reminders` - 未完了の請求書を判定し、必要なリマインダーを送信する
//! - `POST /send-bill-reminder` - 受け取った通知ペイロードを 1 通送信する
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Checked 3 reminders, sent 1 emails",
//!   "date": "2024-03-10",
//!   "emailResults": [
//!     { "reminder": "Rent", "status": "sent", "daysOverdue": 0 },
//!     { "reminder": "Internet", "status": "failed", "error": "Resend API error: 403 - ..." }
//!   ]
//! }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use billminder_domain::{
    dispatch::{AggregateReport, DispatchOutcome, DispatchStatus},
    notification::ReminderNotification,
};
use billminder_shared::{
    event_log::{error as error_log, event},
    log_business_event,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::ServiceError, usecase::ReminderCheckUseCase};

/// リマインダー API の共有状態
pub struct ReminderState {
    pub usecase: ReminderCheckUseCase,
}

// --- レスポンス型 ---

/// 判定パスのレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRemindersResponse {
    pub success:       bool,
    pub message:       String,
    pub date:          NaiveDate,
    pub email_results: Vec<EmailResultDto>,
}

impl From<AggregateReport> for CheckRemindersResponse {
    fn from(report: AggregateReport) -> Self {
        Self {
            success:       true,
            message:       report.summary(),
            date:          report.date,
            email_results: report
                .outcomes
                .into_iter()
                .map(EmailResultDto::from)
                .collect(),
        }
    }
}

/// 請求書ごとの送信結果 DTO
///
/// `sent` の場合は `daysOverdue`、それ以外は `error` を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResultDto {
    pub reminder:     String,
    pub status:       DispatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:        Option<String>,
}

impl From<DispatchOutcome> for EmailResultDto {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            reminder:     outcome.description,
            status:       outcome.status,
            days_overdue: outcome.days_overdue,
            error:        outcome.error,
        }
    }
}

/// 単発送信のレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReminderResponse {
    pub success:  bool,
    pub message:  String,
    pub email_id: Option<String>,
}

// --- ハンドラ ---

/// POST /check-bill-reminders
///
/// 未完了の請求書を判定し、必要なリマインダーを送信して結果を返す。
/// ストアから取得できない場合のみ 500 を返す。
#[tracing::instrument(skip_all)]
pub async fn check_bill_reminders(
    State(state): State<Arc<ReminderState>>,
) -> Result<Json<CheckRemindersResponse>, ServiceError> {
    let report = state.usecase.check_reminders().await?;

    Ok(Json(CheckRemindersResponse::from(report)))
}

/// POST /send-bill-reminder
///
/// `{to, subject, reminderData}` を受け取り、1 通送信する。
/// 不正なボディや送信失敗は 400 `{success: false, error}` を返す。
#[tracing::instrument(skip_all)]
pub async fn send_bill_reminder(
    State(state): State<Arc<ReminderState>>,
    payload: Result<Json<ReminderNotification>, JsonRejection>,
) -> Result<Json<SendReminderResponse>, ServiceError> {
    let Json(notification) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;

    if notification.to.trim().is_empty() {
        return Err(ServiceError::BadRequest(
            "Recipient address (to) is required".to_string(),
        ));
    }

    let receipt = state
        .usecase
        .dispatcher()
        .send(&notification)
        .await
        .map_err(|e| {
            let action = if e.is_rejection() {
                event::action::NOTIFICATION_FAILED
            } else {
                event::action::NOTIFICATION_ERRORED
            };
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = action,
                event.result = event::result::FAILURE,
                error.category = error_log::category::EXTERNAL_SERVICE,
                error = %e,
                "単発リマインダーメールの送信に失敗"
            );
            ServiceError::BadRequest(e.to_string())
        })?;

    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_SENT,
        event.result = event::result::SUCCESS,
        notification.email_id = receipt.email_id.as_deref().unwrap_or(""),
        "単発リマインダーメール送信成功"
    );

    Ok(Json(SendReminderResponse {
        success:  true,
        message:  "Email sent successfully".to_string(),
        email_id: receipt.email_id,
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use billminder_domain::{
        bill_reminder::{BillReminder, BillReminderId},
        clock::FixedClock,
        evaluation::EscalationPolicy,
    };
    use billminder_infra::mock::{MockBillReminderRepository, MockNotificationSender};
    use billminder_shared::FailureResponse;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        handler::router,
        usecase::{DispatchConfig, ReminderDispatcher},
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn bill(description: &str, date: &str, is_completed: bool) -> BillReminder {
        BillReminder::new(
            BillReminderId::new(),
            description,
            "utilities",
            Some(80.0),
            "monthly",
            date,
            is_completed,
        )
    }

    fn create_test_app(store: MockBillReminderRepository, sender: MockNotificationSender) -> Router {
        let dispatcher = ReminderDispatcher::new(
            Arc::new(sender),
            DispatchConfig {
                recipient:    "me@example.com".to_string(),
                policy:       EscalationPolicy::default(),
                send_timeout: Duration::from_secs(10),
            },
        );
        let usecase = ReminderCheckUseCase::new(
            Arc::new(store),
            Arc::new(FixedClock::at_date(today())),
            dispatcher,
        );

        router(Arc::new(ReminderState { usecase }))
    }

    async fn response_body<T: serde::de::DeserializeOwned>(
        response: axum::http::Response<Body>,
    ) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn test_check_bill_reminders正常系_結果一覧と要約を返す() {
        // Given
        let store = MockBillReminderRepository::with_reminders(vec![
            bill("Rent", "2024-03-10", false),
            bill("Internet", "2024-03-06", false),
            bill("Water", "2024-03-07", false),
            bill("Paid", "2024-03-10", true),
        ]);
        let sender = MockNotificationSender::new();
        sender.reject_for("Internet", "Resend API error: 403 - forbidden");
        let sut = create_test_app(store, sender);

        // When
        let response = sut
            .oneshot(post("/check-bill-reminders", Body::empty()))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "message": "Checked 3 reminders, sent 1 emails",
                "date": "2024-03-10",
                "emailResults": [
                    { "reminder": "Rent", "status": "sent", "daysOverdue": 0 },
                    {
                        "reminder": "Internet",
                        "status": "failed",
                        "error": "Resend API error: 403 - forbidden"
                    }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_check_bill_remindersストア障害で500が返る() {
        // Given
        let store = MockBillReminderRepository::new();
        store.fail_with("connection refused");
        let sut = create_test_app(store, MockNotificationSender::new());

        // When
        let response = sut
            .oneshot(post("/check-bill-reminders", Body::empty()))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: FailureResponse = response_body(response).await;
        assert!(!body.success);
        assert!(body.error.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_send_bill_reminder正常系_email_idを返す() {
        // Given
        let sender = MockNotificationSender::new();
        let sut = create_test_app(MockBillReminderRepository::new(), sender.clone());
        let payload = serde_json::json!({
            "to": "someone@example.com",
            "subject": "Bill Reminder: Rent",
            "reminderData": {
                "description": "Rent",
                "category": "housing",
                "nextReminderDate": "2024-03-10",
                "amount": 1200,
                "frequency": "monthly",
                "isOverdue": false,
                "daysOverdue": 0
            }
        });

        // When
        let response = sut
            .oneshot(post("/send-bill-reminder", Body::from(payload.to_string())))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: SendReminderResponse = response_body(response).await;
        assert!(body.success);
        assert_eq!(body.message, "Email sent successfully");
        assert_eq!(body.email_id.as_deref(), Some("mock-email-1"));
        assert_eq!(sender.sent()[0].to, "someone@example.com");
    }

    #[tokio::test]
    async fn test_send_bill_reminder送信拒否で400が返る() {
        // Given
        let sender = MockNotificationSender::new();
        sender.reject_for("Rent", "Resend API error: 422 - invalid to");
        let sut = create_test_app(MockBillReminderRepository::new(), sender);
        let payload = serde_json::json!({
            "to": "someone@example.com",
            "subject": "Bill Reminder: Rent",
            "reminderData": {
                "description": "Rent",
                "category": "housing",
                "nextReminderDate": "2024-03-10",
                "frequency": "monthly"
            }
        });

        // When
        let response = sut
            .oneshot(post("/send-bill-reminder", Body::from(payload.to_string())))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: FailureResponse = response_body(response).await;
        assert_eq!(body, FailureResponse::new("Resend API error: 422 - invalid to"));
    }

    #[tokio::test]
    async fn test_send_bill_reminder不正なボディで400が返る() {
        // Given
        let sender = MockNotificationSender::new();
        let sut = create_test_app(MockBillReminderRepository::new(), sender.clone());

        // When
        let response = sut
            .oneshot(post("/send-bill-reminder", Body::from(r#"{"to": "a@b.c"}"#)))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: FailureResponse = response_body(response).await;
        assert!(!body.success);
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_send_bill_reminder宛先が空なら400が返る() {
        // Given
        let sut = create_test_app(
            MockBillReminderRepository::new(),
            MockNotificationSender::new(),
        );
        let payload = serde_json::json!({
            "to": "",
            "subject": "Bill Reminder: Rent",
            "reminderData": {
                "description": "Rent",
                "category": "housing",
                "nextReminderDate": "2024-03-10",
                "frequency": "monthly"
            }
        });

        // When
        let response = sut
            .oneshot(post("/send-bill-reminder", Body::from(payload.to_string())))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_email_result_dtoはsent以外でdays_overdueを出力しない() {
        let dto = EmailResultDto::from(DispatchOutcome::errored(
            BillReminderId::new(),
            "Broken",
            "送信がタイムアウトしました（10秒）",
        ));

        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            serde_json::json!({
                "reminder": "Broken",
                "status": "errored",
                "error": "送信がタイムアウトしました（10秒）"
            })
        );
    }
}

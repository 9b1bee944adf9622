//! 判定パスの統合テスト
//!
//! 環境変数形式の設定からルーターを組み立て、HTTP 経由で判定パス全体を実行する。
//! ストアと送信者はインメモリのモックに差し替える。

use std::{collections::HashMap, sync::Arc};

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
use billminder_reminder_service::{
    config::ReminderServiceConfig,
    handler::{CheckRemindersResponse, EmailResultDto, ReminderState, router},
    usecase::{DispatchConfig, ReminderCheckUseCase, ReminderDispatcher},
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tower::ServiceExt;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn bill(description: &str, date: &str, is_completed: bool) -> BillReminder {
    BillReminder::new(
        BillReminderId::new(),
        description,
        "credit-card",
        Some(250.0),
        "bi-monthly",
        date,
        is_completed,
    )
}

fn load_config(extra: &[(&str, &str)]) -> ReminderServiceConfig {
    let mut vars: HashMap<String, String> = [
        ("REMINDER_PORT", "3000"),
        ("DATABASE_URL", "postgres://localhost/billminder_test"),
        ("REMINDER_RECIPIENT", "owner@example.com"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    ReminderServiceConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn build_app(
    config: &ReminderServiceConfig,
    store: MockBillReminderRepository,
    sender: MockNotificationSender,
) -> Router {
    let dispatcher = ReminderDispatcher::new(
        Arc::new(sender),
        DispatchConfig {
            recipient:    config.dispatch.recipient.clone(),
            policy:       EscalationPolicy::new(config.dispatch.escalation_interval_days).unwrap(),
            send_timeout: config.dispatch.send_timeout,
        },
    );
    let usecase = ReminderCheckUseCase::new(
        Arc::new(store),
        Arc::new(FixedClock::at_date(today())),
        dispatcher,
    );
    router(Arc::new(ReminderState { usecase }))
}

async fn check(app: Router) -> (StatusCode, CheckRemindersResponse) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/check-bill-reminders")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_判定パス_期日と延滞周期に応じて送信し結果を集計する() {
    // Arrange
    let config = load_config(&[]);
    let store = MockBillReminderRepository::with_reminders(vec![
        bill("Due today", "2024-03-10", false),
        bill("Overdue 1 day", "2024-03-09", false),
        bill("Overdue 3 days", "2024-03-07", false),
        bill("Overdue 4 days", "2024-03-06", false),
        bill("Not yet", "2024-03-15", false),
        bill("Completed", "2024-03-06", true),
        bill("Rejected", "2024-03-08", false),
        bill("Broken date", "next tuesday", false),
    ]);
    let sender = MockNotificationSender::new();
    sender.reject_for("Rejected", "Resend API error: 403 - domain not verified");
    let app = build_app(&config, store, sender.clone());

    // Act
    let (status, body) = check(app).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert!(body.success);
    assert_eq!(body.date, today());
    assert_eq!(body.message, "Checked 7 reminders, sent 2 emails");

    let reminders: Vec<_> = body
        .email_results
        .iter()
        .map(|r| r.reminder.as_str())
        .collect();
    assert_eq!(
        reminders,
        vec!["Due today", "Overdue 4 days", "Rejected", "Broken date"]
    );
    assert_eq!(
        body.email_results[2],
        EmailResultDto {
            reminder:     "Rejected".to_string(),
            status:       billminder_domain::dispatch::DispatchStatus::Failed,
            days_overdue: None,
            error:        Some("Resend API error: 403 - domain not verified".to_string()),
        }
    );

    let subjects: Vec<_> = sender.sent().into_iter().map(|n| n.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Bill Reminder: Due today".to_string(),
            "Overdue Bill Reminder: Overdue 4 days (4 days overdue)".to_string(),
        ]
    );
    assert!(sender.sent().iter().all(|n| n.to == "owner@example.com"));
}

#[tokio::test]
async fn test_判定パス_再送周期の設定が反映される() {
    // Arrange
    let config = load_config(&[("ESCALATION_INTERVAL_DAYS", "3")]);
    let store = MockBillReminderRepository::with_reminders(vec![
        bill("Overdue 2 days", "2024-03-08", false),
        bill("Overdue 3 days", "2024-03-07", false),
    ]);
    let sender = MockNotificationSender::new();
    let app = build_app(&config, store, sender.clone());

    // Act
    let (_, body) = check(app).await;

    // Assert
    assert_eq!(body.message, "Checked 2 reminders, sent 1 emails");
    assert_eq!(body.email_results[0].reminder, "Overdue 3 days");
    assert_eq!(body.email_results[0].days_overdue, Some(3));
}

#[tokio::test]
async fn test_判定パス_同じ日に2回実行すると同じ判定結果になる() {
    // Arrange
    let config = load_config(&[]);
    let store = MockBillReminderRepository::with_reminders(vec![
        bill("Due today", "2024-03-10", false),
        bill("Overdue 2 days", "2024-03-08", false),
    ]);
    let sender = MockNotificationSender::new();
    let app = build_app(&config, store, sender.clone());

    // Act
    let (_, first) = check(app.clone()).await;
    let (_, second) = check(app).await;

    // Assert
    assert_eq!(first.message, second.message);
    let statuses = |r: &CheckRemindersResponse| {
        r.email_results
            .iter()
            .map(|e| (e.reminder.clone(), e.status, e.days_overdue))
            .collect::<Vec<_>>()
    };
    assert_eq!(statuses(&first), statuses(&second));
    assert_eq!(sender.sent().len(), 4);
}

#[tokio::test]
async fn test_判定パス_請求書がなければ0件の結果を返す() {
    let config = load_config(&[]);
    let app = build_app(
        &config,
        MockBillReminderRepository::new(),
        MockNotificationSender::new(),
    );

    let (status, body) = check(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.message, "Checked 0 reminders, sent 0 emails");
    assert!(body.email_results.is_empty());
}

//! # Reminder Service サーバー
//!
//! 請求書リマインダーの判定と送信を行う HTTP サービス。
//!
//! ## 役割
//!
//! - **判定パス**: 未完了の請求書を読み取り、当日期日と延滞中の請求書にメールを送る
//! - **単発送信**: 受け取った通知ペイロードを 1 通送信する
//!
//! 判定パスはスケジューラ（cron など）から 1 日 1 回呼び出される想定。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `REMINDER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `REMINDER_PORT` | **Yes** | ポート番号 |
//! | `REMINDER_STORE_BACKEND` | No | `postgres`（デフォルト）または `supabase` |
//! | `DATABASE_URL` | postgres の場合 | PostgreSQL 接続 URL |
//! | `RUN_MIGRATIONS` | No | 起動時にマイグレーションを適用するか（デフォルト: `false`） |
//! | `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY` | supabase の場合 | PostgREST 接続情報 |
//! | `NOTIFICATION_BACKEND` | No | `resend` / `smtp` / `ses` / `relay` / `noop`（デフォルト） |
//! | `REMINDER_RECIPIENT` | **Yes** | リマインダーの送信先 |
//! | `NOTIFICATION_FROM_ADDRESS` | No | 送信元（デフォルト: `onboarding@resend.dev`） |
//! | `RESEND_API_KEY` | resend の場合 | Resend の API キー |
//! | `ESCALATION_INTERVAL_DAYS` | No | 延滞時の再送周期（デフォルト: `2`） |
//! | `SEND_TIMEOUT_SECS` | No | 1 通あたりの送信タイムアウト（デフォルト: `10`） |
//! | `LOG_FORMAT` / `RUST_LOG` | No | ログ形式とフィルタ |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p billminder-reminder-service
//!
//! # 本番環境
//! REMINDER_PORT=3000 DATABASE_URL=postgres://... REMINDER_RECIPIENT=me@example.com \
//!   NOTIFICATION_BACKEND=resend RESEND_API_KEY=re_... \
//!   cargo run -p billminder-reminder-service --release
//! ```

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context as _;
use billminder_domain::{clock::SystemClock, evaluation::EscalationPolicy};
use billminder_infra::{
    db,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        RelayNotificationSender,
        ResendNotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
        TemplateRenderer,
    },
    repository::{
        BillReminderRepository,
        PostgresBillReminderRepository,
        SupabaseBillReminderRepository,
    },
};
use billminder_reminder_service::{
    config::{NotificationConfig, ReminderServiceConfig, SenderBackend, StoreConfig},
    handler::{ReminderState, router},
    usecase::{DispatchConfig, ReminderCheckUseCase, ReminderDispatcher},
};
use billminder_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// PostgREST 呼び出しのタイムアウト
const STORE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reminder Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("reminder-service");
    init_tracing(&tracing_config);

    // 設定読み込み
    let config = ReminderServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Reminder Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // 依存コンポーネントを初期化
    let store = build_store(&config).await?;
    let sender = build_sender(
        &config.notification,
        config.dispatch.escalation_interval_days,
    )
    .await?;

    let dispatcher = ReminderDispatcher::new(
        sender,
        DispatchConfig {
            recipient:    config.dispatch.recipient.clone(),
            policy:       EscalationPolicy::new(config.dispatch.escalation_interval_days)?,
            send_timeout: config.dispatch.send_timeout,
        },
    );
    let usecase = ReminderCheckUseCase::new(store, Arc::new(SystemClock), dispatcher);
    let state = Arc::new(ReminderState { usecase });

    // ルーター構築
    let app = router(state);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("有効なバインドアドレスではありません")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} へのバインドに失敗しました"))?;
    tracing::info!("Reminder Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await.context("サーバーエラー")?;

    Ok(())
}

/// 設定に応じてリマインダーストアを作成する
async fn build_store(
    config: &ReminderServiceConfig,
) -> anyhow::Result<Arc<dyn BillReminderRepository>> {
    match &config.store {
        StoreConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url)
                .await
                .context("データベース接続に失敗しました")?;
            tracing::info!("データベースに接続しました");

            if config.run_migrations {
                db::run_migrations(&pool)
                    .await
                    .context("マイグレーションの適用に失敗しました")?;
                tracing::info!("マイグレーションを適用しました");
            }

            Ok(Arc::new(PostgresBillReminderRepository::new(pool)))
        }
        StoreConfig::Supabase {
            url,
            service_role_key,
        } => {
            let repo = SupabaseBillReminderRepository::new(
                url,
                service_role_key.clone(),
                STORE_REQUEST_TIMEOUT,
            )
            .context("Supabase クライアントの作成に失敗しました")?;
            tracing::info!("Supabase ストアを使用します: {}", url);
            Ok(Arc::new(repo))
        }
    }
}

/// 設定に応じてメール送信者を作成する
async fn build_sender(
    config: &NotificationConfig,
    escalation_interval_days: u32,
) -> anyhow::Result<Arc<dyn NotificationSender>> {
    let from_address = config.from_address.clone();

    let sender: Arc<dyn NotificationSender> = match &config.backend {
        SenderBackend::Resend { api_key, api_url } => {
            tracing::info!("通知バックエンド: Resend ({})", api_url);
            Arc::new(ResendNotificationSender::new(
                api_url,
                api_key.clone(),
                from_address,
                TemplateRenderer::new(escalation_interval_days)?,
            ))
        }
        SenderBackend::Smtp { host, port } => {
            tracing::info!("通知バックエンド: SMTP ({}:{})", host, port);
            Arc::new(SmtpNotificationSender::new(
                host,
                *port,
                from_address,
                TemplateRenderer::new(escalation_interval_days)?,
            ))
        }
        SenderBackend::Ses => {
            tracing::info!("通知バックエンド: SES");
            Arc::new(
                SesNotificationSender::from_env(
                    from_address,
                    TemplateRenderer::new(escalation_interval_days)?,
                )
                .await,
            )
        }
        SenderBackend::Relay { url, token } => {
            tracing::info!("通知バックエンド: リレー ({})", url);
            Arc::new(RelayNotificationSender::new(url.clone(), token.clone()))
        }
        SenderBackend::Noop => {
            tracing::info!("通知バックエンド: Noop（メール送信なし）");
            Arc::new(NoopNotificationSender)
        }
    };

    Ok(sender)
}

//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してテキストメールを送信する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::{DisplayErrorContext, SdkError},
    types::{Body, Content, Destination, EmailContent, Message},
};
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};

use super::{NotificationSender, TemplateRenderer};

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
pub struct SesNotificationSender {
    client:       Client,
    from_address: String,
    renderer:     TemplateRenderer,
}

impl SesNotificationSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    /// - `renderer`: テキスト本文のレンダラー
    pub fn new(client: Client, from_address: String, renderer: TemplateRenderer) -> Self {
        Self {
            client,
            from_address,
            renderer,
        }
    }

    /// SDK のデフォルト設定チェーンからクライアントを作成する
    ///
    /// リージョンと認証情報は `AWS_REGION` / `AWS_ACCESS_KEY_ID` 等の環境変数、
    /// または実行環境の IAM ロールから解決される。
    pub async fn from_env(from_address: String, renderer: TemplateRenderer) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&config), from_address, renderer)
    }
}

fn content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .build()
        .map_err(|e| NotificationError::Rejected(format!("{part}構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    #[tracing::instrument(skip_all, fields(subject = %notification.subject))]
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        let text = self.renderer.render_text(&notification.reminder_data)?;

        let destination = Destination::builder()
            .to_addresses(&notification.to)
            .build();

        let email_content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(content(&notification.subject, "件名")?)
                    .body(Body::builder().text(content(&text, "テキスト本文")?).build())
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(email_content)
            .send()
            .await
            .map_err(|e| {
                let detail = format!("SES 送信失敗: {}", DisplayErrorContext(&e));
                match e {
                    SdkError::ServiceError(_) => NotificationError::Rejected(detail),
                    _ => NotificationError::Transport(detail),
                }
            })?;

        Ok(SendReceipt {
            email_id: output.message_id().map(str::to_string),
        })
    }
}

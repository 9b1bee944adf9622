//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してテキストメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Message, header::ContentType},
    transport::smtp,
};

use super::{NotificationSender, TemplateRenderer};

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    renderer:     TemplateRenderer,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `from_address`: 送信元メールアドレス
    /// - `renderer`: テキスト本文のレンダラー
    pub fn new(host: &str, port: u16, from_address: String, renderer: TemplateRenderer) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self {
            transport,
            from_address,
            renderer,
        }
    }

    fn build_message(
        &self,
        notification: &ReminderNotification,
        text: String,
    ) -> Result<Message, NotificationError> {
        Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| NotificationError::Rejected(format!("送信元アドレス不正: {e}")))?,
            )
            .to(notification
                .to
                .parse()
                .map_err(|e| NotificationError::Rejected(format!("宛先アドレス不正: {e}")))?)
            .subject(&notification.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(text)
            .map_err(|e| NotificationError::Rejected(format!("メッセージ構築失敗: {e}")))
    }
}

/// SMTP エラーを送信エラーに変換する
///
/// サーバーが応答コードで拒否した場合のみ `Rejected` とする。
fn classify(error: smtp::Error) -> NotificationError {
    if error.is_permanent() || error.is_transient() {
        NotificationError::Rejected(format!("SMTP 送信拒否: {error}"))
    } else {
        NotificationError::Transport(format!("SMTP 送信失敗: {error}"))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    #[tracing::instrument(skip_all, fields(subject = %notification.subject))]
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        let text = self.renderer.render_text(&notification.reminder_data)?;
        let message = self.build_message(notification, text)?;

        self.transport.send(message).await.map_err(classify)?;

        Ok(SendReceipt::default())
    }
}

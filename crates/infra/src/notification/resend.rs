//! Resend 通知送信実装
//!
//! Resend の HTTP API（`POST {api_url}/emails`）でメールを送信する。
//! 本番環境で使用する。
//!
//! 非 2xx 応答はプロバイダによる拒否として
//! `Resend API error: {status} - {body}` のメッセージで返す。

use async_trait::async_trait;
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};
use serde::{Deserialize, Serialize};

use super::{NotificationSender, TemplateRenderer};

/// Resend API の既定エンドポイント
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// `POST /emails` のリクエストボディ
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from:    &'a str,
    to:      [&'a str; 1],
    subject: &'a str,
    text:    String,
}

/// `POST /emails` の成功レスポンス
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Resend 通知送信
pub struct ResendNotificationSender {
    client:       reqwest::Client,
    api_url:      String,
    api_key:      String,
    from_address: String,
    renderer:     TemplateRenderer,
}

impl ResendNotificationSender {
    /// 新しい Resend 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `api_url`: API のベース URL（通常は [`DEFAULT_RESEND_API_URL`]）
    /// - `api_key`: Resend の API キー
    /// - `from_address`: 送信元メールアドレス
    /// - `renderer`: テキスト本文のレンダラー
    pub fn new(
        api_url: &str,
        api_key: String,
        from_address: String,
        renderer: TemplateRenderer,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            from_address,
            renderer,
        }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.api_url)
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    #[tracing::instrument(skip_all, fields(subject = %notification.subject))]
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        let text = self.renderer.render_text(&notification.reminder_data)?;

        let request = SendEmailRequest {
            from: &self.from_address,
            to: [notification.to.as_str()],
            subject: &notification.subject,
            text,
        };

        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(format!("Resend API 呼び出し失敗: {e}")))?;

        handle_response(response).await
    }
}

/// Resend API のレスポンスを送信結果に変換する
async fn handle_response(response: reqwest::Response) -> Result<SendReceipt, NotificationError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| NotificationError::Transport(format!("レスポンス読み取り失敗: {e}")))?;

    if !status.is_success() {
        return Err(NotificationError::Rejected(format!(
            "Resend API error: {} - {body}",
            status.as_u16()
        )));
    }

    // 2xx であれば送信済みとみなす。ID が読めなくても失敗にはしない
    let email_id = serde_json::from_str::<SendEmailResponse>(&body)
        .ok()
        .and_then(|r| r.id);

    Ok(SendReceipt { email_id })
}

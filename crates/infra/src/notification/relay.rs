//! リレー通知送信実装
//!
//! 通知ペイロード `{to, subject, reminderData}` をそのまま
//! リモートの送信エンドポイント（別デプロイの `POST /send-bill-reminder`）へ転送する。
//! 判定と送信を別プロセスに分けて運用する場合に使用する。

use async_trait::async_trait;
use billminder_domain::notification::{NotificationError, ReminderNotification, SendReceipt};
use serde::Deserialize;

use super::NotificationSender;

/// 送信エンドポイントの成功レスポンス
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayResponse {
    email_id: Option<String>,
}

/// リレー通知送信
#[derive(Debug, Clone)]
pub struct RelayNotificationSender {
    client: reqwest::Client,
    url:    String,
    token:  Option<String>,
}

impl RelayNotificationSender {
    /// 新しいリレー送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `url`: 送信エンドポイントの URL
    /// - `token`: 指定時は `Authorization: Bearer` ヘッダに載せる
    pub fn new(url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            token,
        }
    }
}

#[async_trait]
impl NotificationSender for RelayNotificationSender {
    #[tracing::instrument(skip_all, fields(subject = %notification.subject))]
    async fn send(
        &self,
        notification: &ReminderNotification,
    ) -> Result<SendReceipt, NotificationError> {
        let mut request = self.client.post(&self.url).json(notification);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Transport(format!("リレー呼び出し失敗: {e}")))?;

        handle_response(response).await
    }
}

/// 送信エンドポイントのレスポンスを送信結果に変換する
///
/// 非成功時はレスポンスボディを原文のまま拒否理由にする。
async fn handle_response(response: reqwest::Response) -> Result<SendReceipt, NotificationError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| NotificationError::Transport(format!("レスポンス読み取り失敗: {e}")))?;

    if !status.is_success() {
        return Err(NotificationError::Rejected(body));
    }

    let email_id = serde_json::from_str::<RelayResponse>(&body)
        .ok()
        .and_then(|r| r.email_id);

    Ok(SendReceipt { email_id })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn response(status: u16, body: &str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn 成功レスポンスのemail_idを受領に入れる() {
        let body = r#"{"success":true,"message":"Email sent successfully","emailId":"abc-123"}"#;

        let receipt = handle_response(response(200, body)).await.unwrap();

        assert_eq!(receipt, SendReceipt::with_id("abc-123"));
    }

    #[tokio::test]
    async fn 非成功レスポンスのボディを原文のまま拒否理由にする() {
        let body = r#"{"success":false,"error":"Resend API error: 403 - forbidden"}"#;

        let err = handle_response(response(400, body)).await.unwrap_err();

        assert_eq!(err, NotificationError::Rejected(body.to_string()));
    }
}

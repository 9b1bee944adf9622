//! # Reminder Service 設定
//!
//! 環境変数から Reminder Service の設定を読み込む。
//!
//! 読み込みは [`ReminderServiceConfig::from_lookup`] に集約し、
//! テストでは環境変数の代わりに任意のキー・値の組を渡せるようにしている。

use std::{env, time::Duration};

use billminder_domain::evaluation::DEFAULT_ESCALATION_INTERVAL_DAYS;
use billminder_infra::notification::DEFAULT_RESEND_API_URL;
use thiserror::Error;

const DEFAULT_FROM_ADDRESS: &str = "onboarding@resend.dev";
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 必須の環境変数が設定されていない
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{key} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: String,
    },
}

/// Reminder Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderServiceConfig {
    /// バインドアドレス
    pub host:           String,
    /// ポート番号
    pub port:           u16,
    /// 起動時に埋め込みマイグレーションを適用するか
    pub run_migrations: bool,
    /// リマインダーストア
    pub store:          StoreConfig,
    /// 通知設定
    pub notification:   NotificationConfig,
    /// 判定パスの設定
    pub dispatch:       DispatchSettings,
}

/// リマインダーストアの設定
///
/// `REMINDER_STORE_BACKEND` で切り替える:
/// - `postgres`: PostgreSQL に直接接続
/// - `supabase`: Supabase の PostgREST API 経由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
    },
    Supabase {
        url:              String,
        service_role_key: String,
    },
}

/// 通知機能の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:      SenderBackend,
    /// 送信元メールアドレス
    pub from_address: String,
}

/// メール送信バックエンド
///
/// `NOTIFICATION_BACKEND` 環境変数で切り替える:
/// - `resend`: Resend HTTP API 経由で送信（本番）
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `ses`: Amazon SES v2 経由で送信
/// - `relay`: リモートの送信エンドポイントへ転送
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderBackend {
    Resend { api_key: String, api_url: String },
    Smtp { host: String, port: u16 },
    Ses,
    Relay { url: String, token: Option<String> },
    Noop,
}

/// 判定パスの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// リマインダーの送信先（固定）
    pub recipient:                String,
    /// 延滞時の再送周期（日）
    pub escalation_interval_days: u32,
    /// 1 通あたりの送信タイムアウト
    pub send_timeout:             Duration,
}

impl ReminderServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            host:           vars.or("REMINDER_HOST", "0.0.0.0"),
            port:           vars.parse_required("REMINDER_PORT")?,
            run_migrations: vars.parse_or("RUN_MIGRATIONS", false)?,
            store:          StoreConfig::from_vars(&vars)?,
            notification:   NotificationConfig::from_vars(&vars)?,
            dispatch:       DispatchSettings::from_vars(&vars)?,
        })
    }
}

impl StoreConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let backend = vars.or("REMINDER_STORE_BACKEND", "postgres");
        match backend.as_str() {
            "postgres" => Ok(Self::Postgres {
                database_url: vars.required("DATABASE_URL")?,
            }),
            "supabase" => Ok(Self::Supabase {
                url:              vars.required("SUPABASE_URL")?,
                service_role_key: vars.required("SUPABASE_SERVICE_ROLE_KEY")?,
            }),
            _ => Err(ConfigError::Invalid {
                key:    "REMINDER_STORE_BACKEND",
                value:  backend,
                reason: "postgres または supabase を指定してください".to_string(),
            }),
        }
    }
}

impl NotificationConfig {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let backend = vars.or("NOTIFICATION_BACKEND", "noop");
        let backend = match backend.as_str() {
            "resend" => SenderBackend::Resend {
                api_key: vars.required("RESEND_API_KEY")?,
                api_url: vars.or("RESEND_API_URL", DEFAULT_RESEND_API_URL),
            },
            "smtp" => SenderBackend::Smtp {
                host: vars.or("SMTP_HOST", "localhost"),
                port: vars.parse_or("SMTP_PORT", 1025)?,
            },
            "ses" => SenderBackend::Ses,
            "relay" => SenderBackend::Relay {
                url:   vars.required("RELAY_URL")?,
                token: vars.get("RELAY_TOKEN"),
            },
            "noop" => SenderBackend::Noop,
            _ => {
                return Err(ConfigError::Invalid {
                    key:    "NOTIFICATION_BACKEND",
                    value:  backend,
                    reason: "resend, smtp, ses, relay, noop のいずれかを指定してください"
                        .to_string(),
                });
            }
        };

        Ok(Self {
            backend,
            from_address: vars.or("NOTIFICATION_FROM_ADDRESS", DEFAULT_FROM_ADDRESS),
        })
    }
}

impl DispatchSettings {
    fn from_vars<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let escalation_interval_days =
            vars.parse_or("ESCALATION_INTERVAL_DAYS", DEFAULT_ESCALATION_INTERVAL_DAYS)?;
        if escalation_interval_days == 0 {
            return Err(ConfigError::Invalid {
                key:    "ESCALATION_INTERVAL_DAYS",
                value:  "0".to_string(),
                reason: "1 以上を指定してください".to_string(),
            });
        }

        let send_timeout_secs: u64 = vars.parse_or("SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS)?;
        if send_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key:    "SEND_TIMEOUT_SECS",
                value:  "0".to_string(),
                reason: "1 以上を指定してください".to_string(),
            });
        }

        Ok(Self {
            recipient: vars.required("REMINDER_RECIPIENT")?,
            escalation_interval_days,
            send_timeout: Duration::from_secs(send_timeout_secs),
        })
    }
}

/// キー参照関数のラッパー
///
/// 空文字列は未設定として扱う。
struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse_required<T>(&self, key: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.required(key)?;
        parse_value(key, value)
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(value) => parse_value(key, value),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

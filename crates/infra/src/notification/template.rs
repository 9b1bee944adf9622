//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンでリマインダー通知のテキスト本文を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **プレーンテキストのみ**: HTML 本文は生成しない
//! - **表示用の整形は Rust 側で行う**: カテゴリ・頻度の人間向け表記、
//!   期日の長い形式、金額表記はコンテキストに入れる前に整形する

use billminder_domain::{
    evaluation::parse_reminder_date,
    notification::{NotificationError, ReminderData},
};
use tera::{Context, Tera};

const BILL_REMINDER_TEMPLATE: &str = "bill_reminder.txt";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、[`ReminderData`] からテキスト本文を生成する。
pub struct TemplateRenderer {
    engine:                   Tera,
    escalation_interval_days: u32,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `escalation_interval_days` は延滞時の「N 日ごとに再送する」案内文に使う。
    pub fn new(escalation_interval_days: u32) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_template(
                BILL_REMINDER_TEMPLATE,
                include_str!("../../../../templates/notifications/bill_reminder.txt"),
            )
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self {
            engine,
            escalation_interval_days,
        })
    }

    /// テキスト本文を生成する
    pub fn render_text(&self, data: &ReminderData) -> Result<String, NotificationError> {
        let context = self.build_context(data);

        self.engine
            .render(BILL_REMINDER_TEMPLATE, &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))
    }

    fn build_context(&self, data: &ReminderData) -> Context {
        let mut context = Context::new();
        context.insert("description", &data.description);
        context.insert("category", &humanize_tag(&data.category));
        context.insert("frequency", &humanize_tag(&data.frequency));
        context.insert("due_date", &long_due_date(&data.next_reminder_date));
        context.insert("amount", &amount_label(data.amount));
        context.insert("is_overdue", &data.is_overdue);
        context.insert("days_overdue", &data.days_overdue);
        context.insert("escalation_interval_days", &self.escalation_interval_days);
        context
    }
}

/// カテゴリや頻度のタグを人間向けの表記にする
///
/// `-` を空白に置き換え、各単語の先頭を大文字にする。
///
/// ```
/// use billminder_infra::notification::humanize_tag;
///
/// assert_eq!(humanize_tag("bi-monthly"), "Bi Monthly");
/// ```
pub fn humanize_tag(tag: &str) -> String {
    let mut result = String::with_capacity(tag.len());
    let mut at_word_start = true;

    for c in tag.chars() {
        let c = if c == '-' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }

    result
}

/// 期日を `Monday, January 15, 2024` の形式にする
///
/// 解釈できない値はそのまま返す。
fn long_due_date(value: &str) -> String {
    parse_reminder_date(value)
        .map(|date| date.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// 金額を `$X` の形式にする（未設定や 0 の場合は表示しない）
fn amount_label(amount: Option<f64>) -> Option<String> {
    amount.filter(|a| *a != 0.0).map(|a| format!("${a}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn reminder_data(is_overdue: bool, days_overdue: i64, amount: Option<f64>) -> ReminderData {
        ReminderData {
            description: "Internet".to_string(),
            category: "utilities".to_string(),
            next_reminder_date: "2024-03-06".to_string(),
            amount,
            frequency: "bi-monthly".to_string(),
            is_overdue,
            days_overdue,
        }
    }

    #[rstest]
    #[case("utilities", "Utilities")]
    #[case("bi-monthly", "Bi Monthly")]
    #[case("credit-card-bill", "Credit Card Bill")]
    #[case("Already Title", "Already Title")]
    #[case("", "")]
    fn test_humanize_tag(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(humanize_tag(input), expected);
    }

    #[rstest]
    #[case("2024-01-15", "Monday, January 15, 2024")]
    #[case("2024-03-06", "Wednesday, March 6, 2024")]
    #[case("not-a-date", "not-a-date")]
    fn test_long_due_date(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(long_due_date(input), expected);
    }

    #[rstest]
    #[case(Some(1200.0), Some("$1200"))]
    #[case(Some(59.99), Some("$59.99"))]
    #[case(Some(0.0), None)]
    #[case(None, None)]
    fn test_amount_label(#[case] input: Option<f64>, #[case] expected: Option<&str>) {
        assert_eq!(amount_label(input).as_deref(), expected);
    }

    #[test]
    fn test_当日の本文に延滞表示が含まれない() {
        let renderer = TemplateRenderer::new(2).unwrap();

        let text = renderer
            .render_text(&reminder_data(false, 0, Some(59.99)))
            .unwrap();

        assert!(text.starts_with("Bill Reminder\n"));
        assert!(text.contains("Description: Internet"));
        assert!(text.contains("Category:    Utilities"));
        assert!(text.contains("Due Date:    Wednesday, March 6, 2024"));
        assert!(text.contains("Amount:      $59.99"));
        assert!(text.contains("Frequency:   Bi Monthly"));
        assert!(!text.contains("overdue!"));
        assert!(!text.contains("continue to receive reminders"));
    }

    #[test]
    fn test_延滞の本文に日数と再送周期が含まれる() {
        let renderer = TemplateRenderer::new(3).unwrap();

        let text = renderer.render_text(&reminder_data(true, 4, None)).unwrap();

        assert!(text.starts_with("Overdue Bill Reminder\n"));
        assert!(text.contains("This bill is 4 days overdue!"));
        assert!(text.contains("reminders every 3 days until this is marked complete"));
        assert!(!text.contains("Amount:"));
    }

    #[test]
    fn test_延滞1日は単数形になる() {
        let renderer = TemplateRenderer::new(1).unwrap();

        let text = renderer.render_text(&reminder_data(true, 1, None)).unwrap();

        assert!(text.contains("This bill is 1 day overdue!"));
    }
}

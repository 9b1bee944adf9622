//! # 期日判定（Due-Date Evaluator）
//!
//! 請求書リマインダーごとに「今日」通知すべきかを判定する純粋関数を提供する。
//!
//! ## 判定ルール
//!
//! `days_diff = today − next_reminder_date`（日単位、時刻は切り捨て）として:
//!
//! | days_diff | 状態 | 通知 |
//! |-----------|------|------|
//! | `< 0` | 期日前 | しない |
//! | `0` | 当日 | する |
//! | `> 0` かつ `days_diff % interval == 0` | 延滞 | する |
//! | `> 0` かつ上記以外 | 延滞 | しない |
//!
//! デフォルトの `interval` は 2 日。延滞 1 日目は通知されず、2, 4, 6, … 日目に通知される。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, bill_reminder::BillReminder};

/// デフォルトのエスカレーション間隔（日）
pub const DEFAULT_ESCALATION_INTERVAL_DAYS: u32 = 2;

/// 延滞時の再通知周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    interval_days: u32,
}

impl EscalationPolicy {
    /// 再通知間隔を指定して作成する
    ///
    /// 0 日は周期として成立しないためバリデーションエラーとする。
    pub fn new(interval_days: u32) -> Result<Self, DomainError> {
        if interval_days == 0 {
            return Err(DomainError::Validation(
                "エスカレーション間隔は 1 日以上である必要があります".to_string(),
            ));
        }
        Ok(Self { interval_days })
    }

    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    /// 経過日数から通知要否を判定する
    pub fn should_notify(&self, days_diff: i64) -> bool {
        days_diff == 0 || (days_diff > 0 && days_diff % i64::from(self.interval_days) == 0)
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_ESCALATION_INTERVAL_DAYS,
        }
    }
}

/// 期日に対する状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// 期日前
    NotDue { days_until: i64 },
    /// 当日
    DueToday,
    /// 延滞
    Overdue { days: i64 },
}

/// 1 件の請求書に対する判定結果
///
/// 1 回の判定パスの中でのみ存在する一時的な値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 期日からの経過日数（負なら期日前）
    pub days_diff:     i64,
    /// 今日通知すべきか
    pub should_notify: bool,
    /// 延滞しているか（`days_diff > 0`）
    pub is_overdue:    bool,
}

impl Evaluation {
    pub fn state(&self) -> ReminderState {
        match self.days_diff {
            d if d < 0 => ReminderState::NotDue { days_until: -d },
            0 => ReminderState::DueToday,
            d => ReminderState::Overdue { days: d },
        }
    }
}

/// 請求書の期日を判定する
///
/// 副作用を持たず、同じ入力に対して常に同じ結果を返す。
/// `today` は呼び出し側が [`Clock`](crate::clock::Clock) などから渡す。
///
/// # Errors
///
/// `next_reminder_date` が日付として解釈できない場合は
/// [`DomainError::MalformedRecord`] を返す。
pub fn evaluate(
    bill: &BillReminder,
    today: NaiveDate,
    policy: &EscalationPolicy,
) -> Result<Evaluation, DomainError> {
    let due_date = parse_reminder_date(bill.next_reminder_date()).ok_or_else(|| {
        DomainError::MalformedRecord {
            id:    bill.id().to_string(),
            value: bill.next_reminder_date().to_string(),
        }
    })?;

    let days_diff = (today - due_date).num_days();

    Ok(Evaluation {
        days_diff,
        should_notify: policy.should_notify(days_diff),
        is_overdue: days_diff > 0,
    })
}

/// ストアの日付文字列を日付に変換する
///
/// 受け付ける形式:
/// - `YYYY-MM-DD`
/// - RFC 3339 のタイムスタンプ（UTC に変換してから日付に切り捨て）
/// - タイムゾーンなしのタイムスタンプ（UTC とみなして日付に切り捨て）
pub fn parse_reminder_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::bill_reminder::BillReminderId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn bill_due(date: &str) -> BillReminder {
        BillReminder::new(
            BillReminderId::new(),
            "電気代",
            "utilities",
            Some(84.5),
            "monthly",
            date,
            false,
        )
    }

    fn bill_due_days_ago(days: i64) -> BillReminder {
        let date = today() - chrono::Duration::days(days);
        bill_due(&date.format("%Y-%m-%d").to_string())
    }

    #[rstest]
    #[case(-30)]
    #[case(-2)]
    #[case(-1)]
    fn test_期日前は通知しない(#[case] days_diff: i64) {
        let result = evaluate(
            &bill_due_days_ago(days_diff),
            today(),
            &EscalationPolicy::default(),
        )
        .unwrap();

        assert_eq!(result.days_diff, days_diff);
        assert!(!result.should_notify);
        assert!(!result.is_overdue);
        assert_eq!(
            result.state(),
            ReminderState::NotDue {
                days_until: -days_diff,
            }
        );
    }

    #[test]
    fn test_当日は通知し延滞ではない() {
        let result = evaluate(&bill_due("2024-03-10"), today(), &EscalationPolicy::default()).unwrap();

        assert_eq!(
            result,
            Evaluation {
                days_diff:     0,
                should_notify: true,
                is_overdue:    false,
            }
        );
        assert_eq!(result.state(), ReminderState::DueToday);
    }

    #[test]
    fn test_延滞1日目は通知しない() {
        let result = evaluate(&bill_due_days_ago(1), today(), &EscalationPolicy::default()).unwrap();

        assert_eq!(result.days_diff, 1);
        assert!(!result.should_notify);
        assert!(result.is_overdue);
    }

    #[rstest]
    #[case(2)]
    #[case(4)]
    #[case(6)]
    #[case(30)]
    fn test_延滞の偶数日は通知する(#[case] days_diff: i64) {
        let result = evaluate(
            &bill_due_days_ago(days_diff),
            today(),
            &EscalationPolicy::default(),
        )
        .unwrap();

        assert!(result.should_notify);
        assert!(result.is_overdue);
        assert_eq!(result.state(), ReminderState::Overdue { days: days_diff });
    }

    #[rstest]
    #[case(3)]
    #[case(5)]
    #[case(7)]
    #[case(31)]
    fn test_延滞の1より大きい奇数日は通知しない(#[case] days_diff: i64) {
        let result = evaluate(
            &bill_due_days_ago(days_diff),
            today(),
            &EscalationPolicy::default(),
        )
        .unwrap();

        assert!(!result.should_notify);
        assert!(result.is_overdue);
    }

    #[test]
    fn test_同じ入力で2回判定しても結果は同じ() {
        let bill = bill_due_days_ago(4);
        let policy = EscalationPolicy::default();

        let first = evaluate(&bill, today(), &policy).unwrap();
        let second = evaluate(&bill, today(), &policy).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_時刻付きの日付は日単位に切り捨てて判定する() {
        let late_evening = bill_due("2024-03-10T23:59:59Z");
        let with_offset = bill_due("2024-03-08T10:00:00+00:00");
        let naive = bill_due("2024-03-10 08:30:00");

        let policy = EscalationPolicy::default();

        assert_eq!(evaluate(&late_evening, today(), &policy).unwrap().days_diff, 0);
        assert_eq!(evaluate(&with_offset, today(), &policy).unwrap().days_diff, 2);
        assert_eq!(evaluate(&naive, today(), &policy).unwrap().days_diff, 0);
    }

    #[test]
    fn test_オフセット付きの日付はutcに変換してから切り捨てる() {
        // 2024-03-10T01:00+09:00 は UTC では 2024-03-09T16:00
        let bill = bill_due("2024-03-10T01:00:00+09:00");

        let result = evaluate(&bill, today(), &EscalationPolicy::default()).unwrap();

        assert_eq!(result.days_diff, 1);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-date")]
    #[case("2024-13-01")]
    #[case("2024/03/10")]
    fn test_解釈できない日付はmalformed_recordになる(#[case] value: &str) {
        let bill = bill_due(value);

        let result = evaluate(&bill, today(), &EscalationPolicy::default());

        assert_eq!(
            result,
            Err(DomainError::MalformedRecord {
                id:    bill.id().to_string(),
                value: value.to_string(),
            })
        );
    }

    #[rstest]
    #[case(3, 3, true)]
    #[case(3, 6, true)]
    #[case(3, 2, false)]
    #[case(3, 4, false)]
    #[case(1, 1, true)]
    #[case(1, 5, true)]
    fn test_エスカレーション間隔を変更できる(
        #[case] interval: u32,
        #[case] days_diff: i64,
        #[case] expected: bool,
    ) {
        let policy = EscalationPolicy::new(interval).unwrap();

        let result = evaluate(&bill_due_days_ago(days_diff), today(), &policy).unwrap();

        assert_eq!(result.should_notify, expected);
    }

    #[test]
    fn test_エスカレーション間隔0はバリデーションエラー() {
        assert!(matches!(
            EscalationPolicy::new(0),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_デフォルトのエスカレーション間隔は2日() {
        assert_eq!(EscalationPolicy::default().interval_days(), 2);
    }
}

//! Circulation rules: ledger status transitions and overdue fine arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

const MILLIS_PER_DAY: i64 = 86_400_000;

pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 14;
pub const DEFAULT_FINE_PER_DAY: f64 = 1.0;

/// Lifecycle of a ledger entry.
///
/// `Borrowed` is the only open state; `Returned` and `Overdue` are terminal
/// and differ only in whether a fine was charged at return time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Overdue => "overdue",
        }
    }

    pub fn is_closed(&self) -> bool {
        !matches!(self, TransactionStatus::Borrowed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            "overdue" => Ok(TransactionStatus::Overdue),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown transaction status '{}'",
                other
            ))),
        }
    }
}

/// How long a borrower may keep a book and what each late day costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinePolicy {
    pub grace_period_days: i64,
    pub fine_per_day: f64,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            fine_per_day: DEFAULT_FINE_PER_DAY,
        }
    }
}

/// Result of applying a [`FinePolicy`] to one borrow period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineAssessment {
    pub days_elapsed: i64,
    /// Grace period in days, reported as `dueDate` for API compatibility
    #[serde(rename = "dueDate")]
    pub grace_period_days: i64,
    pub overdue_days: i64,
    #[serde(rename = "fineAmount")]
    pub fine: f64,
}

impl FineAssessment {
    pub fn is_overdue(&self) -> bool {
        self.fine > 0.0
    }

    /// Status the ledger entry takes when it is closed with this assessment.
    pub fn closing_status(&self) -> TransactionStatus {
        if self.is_overdue() {
            TransactionStatus::Overdue
        } else {
            TransactionStatus::Returned
        }
    }
}

impl FinePolicy {
    pub fn assess(&self, borrowed_at: DateTime<Utc>, at: DateTime<Utc>) -> FineAssessment {
        let days_elapsed = days_elapsed(borrowed_at, at);
        let overdue_days = (days_elapsed - self.grace_period_days).max(0);

        FineAssessment {
            days_elapsed,
            grace_period_days: self.grace_period_days,
            overdue_days,
            fine: overdue_days as f64 * self.fine_per_day,
        }
    }
}

/// Whole 24-hour periods between two instants, floored at millisecond
/// precision. Clock skew that puts `at` before `borrowed_at` counts as zero.
pub fn days_elapsed(borrowed_at: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    let millis = (at - borrowed_at).num_milliseconds();
    if millis <= 0 { 0 } else { millis / MILLIS_PER_DAY }
}

/// Human-readable fine, e.g. `$6`, `$2.50` or `No fine`.
pub fn format_fine(amount: f64, currency: &str) -> String {
    if amount <= 0.0 {
        "No fine".to_string()
    } else if amount.fract() == 0.0 {
        format!("{}{:.0}", currency, amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn borrowed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn no_fine_within_grace_period() {
        let policy = FinePolicy::default();
        let assessment = policy.assess(borrowed_at(), borrowed_at() + Duration::days(14));

        assert_eq!(assessment.days_elapsed, 14);
        assert_eq!(assessment.overdue_days, 0);
        assert_eq!(assessment.fine, 0.0);
        assert_eq!(assessment.closing_status(), TransactionStatus::Returned);
    }

    #[test]
    fn six_days_late_costs_six_units() {
        let policy = FinePolicy::default();
        let assessment = policy.assess(borrowed_at(), borrowed_at() + Duration::days(20));

        assert_eq!(assessment.days_elapsed, 20);
        assert_eq!(assessment.overdue_days, 6);
        assert_eq!(assessment.fine, 6.0);
        assert_eq!(assessment.closing_status(), TransactionStatus::Overdue);
    }

    #[test]
    fn partial_days_are_floored() {
        let at = borrowed_at() + Duration::days(15) - Duration::milliseconds(1);
        assert_eq!(days_elapsed(borrowed_at(), at), 14);
        assert_eq!(FinePolicy::default().assess(borrowed_at(), at).fine, 0.0);
    }

    #[test]
    fn clock_skew_counts_as_zero_days() {
        let at = borrowed_at() - Duration::hours(3);
        assert_eq!(days_elapsed(borrowed_at(), at), 0);
    }

    #[test]
    fn custom_rate_and_grace_period() {
        let policy = FinePolicy {
            grace_period_days: 7,
            fine_per_day: 2.5,
        };
        let assessment = policy.assess(borrowed_at(), borrowed_at() + Duration::days(10));
        assert_eq!(assessment.fine, 7.5);
    }

    #[test]
    fn fine_strings() {
        assert_eq!(format_fine(0.0, "$"), "No fine");
        assert_eq!(format_fine(6.0, "$"), "$6");
        assert_eq!(format_fine(7.5, "$"), "$7.50");
        assert_eq!(format_fine(5.0, "₹"), "₹5");
    }

    #[test]
    fn status_parsing() {
        assert_eq!(
            "overdue".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Overdue
        );
        assert!("lost".parse::<TransactionStatus>().is_err());
        assert!(!TransactionStatus::Borrowed.is_closed());
        assert!(TransactionStatus::Returned.is_closed());
    }
}

//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/SQL types here; adapters map into these.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Chat-platform user identifier. Every row in the store is keyed by it.
pub type UserId = i64;

/// Text layout of stored timestamps. Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Which ledger a transaction goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Amount as it affects the running balance: incomes add, expenses subtract.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            EntryKind::Income => amount,
            EntryKind::Expense => -amount,
        }
    }
}

/// A single ledger row to be recorded. Immutable once stored.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub kind: EntryKind,
    pub amount: f64,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

/// Savings goal. `amount` is the remaining distance to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub name: String,
    pub amount: f64,
}

/// Expense category label. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

/// Income and expense sums over a report window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub income: f64,
    pub expenses: f64,
}

impl PeriodTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Report lookback window. Tokens are the user-facing Russian words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// Parse a report token. Anything outside the closed set is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "день" => Some(Period::Day),
            "неделя" => Some(Period::Week),
            "месяц" => Some(Period::Month),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Period::Day => "день",
            Period::Week => "неделя",
            Period::Month => "месяц",
        }
    }

    pub fn lookback_days(self) -> i64 {
        match self {
            Period::Day => 0,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    /// Start of the window: local midnight `lookback_days` before `now`.
    pub fn window_start(self, now: NaiveDateTime) -> NaiveDateTime {
        (now.date() - Duration::days(self.lookback_days())).and_time(NaiveTime::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_period_tokens() {
        assert_eq!(Period::from_token("день"), Some(Period::Day));
        assert_eq!(Period::from_token("неделя"), Some(Period::Week));
        assert_eq!(Period::from_token("месяц"), Some(Period::Month));
        assert_eq!(Period::from_token("day"), None);
        assert_eq!(Period::from_token("Месяц"), None);
    }

    #[test]
    fn test_window_start_is_midnight() {
        let now = at(2024, 3, 15, 18, 42);
        assert_eq!(Period::Day.window_start(now), at(2024, 3, 15, 0, 0));
        assert_eq!(Period::Week.window_start(now), at(2024, 3, 8, 0, 0));
        assert_eq!(Period::Month.window_start(now), at(2024, 2, 14, 0, 0));
    }

    #[test]
    fn test_signed_amounts() {
        assert_eq!(EntryKind::Income.signed(10.0), 10.0);
        assert_eq!(EntryKind::Expense.signed(10.0), -10.0);
        let totals = PeriodTotals {
            income: 500.0,
            expenses: 200.0,
        };
        assert_eq!(totals.net(), 300.0);
    }
}

//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Category, DomainError, Goal, LedgerEntry, PeriodTotals, UserId};
use chrono::NaiveDateTime;

/// Finance store. Users, ledgers, goals, budgets and categories.
#[async_trait::async_trait]
pub trait FinanceRepo: Send + Sync {
    /// Record one income or expense and apply its side effects in a single transaction:
    ///
    /// - insert the ledger row
    /// - add the signed amount to the cached user balance (creating the user row)
    /// - income: upsert-add into the budget; expense: subtract only if a budget row exists
    /// - income decreases every goal's remaining amount, expense increases it
    async fn record_entry(&self, entry: &LedgerEntry) -> Result<(), DomainError>;

    /// `SUM(incomes) - SUM(expenses)` for the user. 0 when there are no rows.
    async fn balance(&self, user_id: UserId) -> Result<f64, DomainError>;

    /// Income and expense sums for rows with `timestamp >= since`.
    async fn totals_since(
        &self,
        user_id: UserId,
        since: NaiveDateTime,
    ) -> Result<PeriodTotals, DomainError>;

    /// Overwrite the user's budget, creating the row if needed.
    async fn set_budget(&self, user_id: UserId, amount: f64) -> Result<(), DomainError>;

    /// Stored budget, or None if never set.
    async fn budget(&self, user_id: UserId) -> Result<Option<f64>, DomainError>;

    /// Overwrite the user's existing goal row(s), or insert one if there is none.
    async fn set_goal(&self, user_id: UserId, name: &str, amount: f64) -> Result<(), DomainError>;

    async fn goals(&self, user_id: UserId) -> Result<Vec<Goal>, DomainError>;

    async fn add_category(&self, user_id: UserId, name: &str) -> Result<(), DomainError>;

    /// Delete all categories with exactly this name. Returns the number of rows removed.
    async fn delete_category(&self, user_id: UserId, name: &str) -> Result<u64, DomainError>;

    async fn categories(&self, user_id: UserId) -> Result<Vec<Category>, DomainError>;
}

/// Wall clock in local time. Stored timestamps and report windows use it.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

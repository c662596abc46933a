//! Finance use cases: record transactions, budgets, goals, categories, reports.
//!
//! Each operation is one or two straight-line calls into FinanceRepo. Timestamps come from the Clock port.

use crate::domain::{
    Category, DomainError, EntryKind, Goal, LedgerEntry, Period, PeriodTotals, UserId,
};
use crate::ports::{Clock, FinanceRepo};
use std::sync::Arc;
use tracing::info;

/// Finance service. Owns the injected store handle and clock.
pub struct FinanceService {
    repo: Arc<dyn FinanceRepo>,
    clock: Arc<dyn Clock>,
}

impl FinanceService {
    pub fn new(repo: Arc<dyn FinanceRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn add_income(
        &self,
        user_id: UserId,
        amount: f64,
        description: &str,
    ) -> Result<(), DomainError> {
        self.record(user_id, EntryKind::Income, amount, description)
            .await
    }

    pub async fn add_expense(
        &self,
        user_id: UserId,
        amount: f64,
        description: &str,
    ) -> Result<(), DomainError> {
        self.record(user_id, EntryKind::Expense, amount, description)
            .await
    }

    async fn record(
        &self,
        user_id: UserId,
        kind: EntryKind,
        amount: f64,
        description: &str,
    ) -> Result<(), DomainError> {
        let entry = LedgerEntry {
            user_id,
            kind,
            amount,
            description: description.to_string(),
            timestamp: self.clock.now(),
        };
        self.repo.record_entry(&entry).await?;
        info!(user_id, ?kind, amount, "transaction recorded");
        Ok(())
    }

    pub async fn balance(&self, user_id: UserId) -> Result<f64, DomainError> {
        self.repo.balance(user_id).await
    }

    pub async fn set_budget(&self, user_id: UserId, amount: f64) -> Result<(), DomainError> {
        self.repo.set_budget(user_id, amount).await?;
        info!(user_id, amount, "budget set");
        Ok(())
    }

    /// Stored budget; 0 when never set.
    pub async fn budget(&self, user_id: UserId) -> Result<f64, DomainError> {
        Ok(self.repo.budget(user_id).await?.unwrap_or(0.0))
    }

    /// Income/expense totals from the start of the period window up to now.
    pub async fn report(&self, user_id: UserId, period: Period) -> Result<PeriodTotals, DomainError> {
        let since = period.window_start(self.clock.now());
        self.repo.totals_since(user_id, since).await
    }

    pub async fn set_goal(
        &self,
        user_id: UserId,
        name: &str,
        amount: f64,
    ) -> Result<(), DomainError> {
        self.repo.set_goal(user_id, name, amount).await?;
        info!(user_id, goal = name, amount, "goal set");
        Ok(())
    }

    pub async fn goals(&self, user_id: UserId) -> Result<Vec<Goal>, DomainError> {
        self.repo.goals(user_id).await
    }

    pub async fn add_category(&self, user_id: UserId, name: &str) -> Result<(), DomainError> {
        self.repo.add_category(user_id, name).await
    }

    /// Removing a name that does not exist is not an error.
    pub async fn delete_category(&self, user_id: UserId, name: &str) -> Result<(), DomainError> {
        let removed = self.repo.delete_category(user_id, name).await?;
        info!(user_id, category = name, removed, "categories deleted");
        Ok(())
    }

    pub async fn categories(&self, user_id: UserId) -> Result<Vec<Category>, DomainError> {
        self.repo.categories(user_id).await
    }
}

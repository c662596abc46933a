//! SQLite-backed finance store via libsql. Implements FinanceRepo.
//!
//! Uses the same libsql backend as grammers-session to avoid duplicate SQLite symbol link errors.
//! One database file holds all users; every table is keyed by the chat user id.
//! A single connection is opened at startup and shared; statements run one at a time.

use crate::domain::{
    Category, DomainError, EntryKind, Goal, LedgerEntry, PeriodTotals, TIMESTAMP_FORMAT, UserId,
};
use crate::ports::FinanceRepo;
use chrono::NaiveDateTime;
use libsql::{Connection, Database, Row, Value, params};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// `users.balance` is a cached running total; displayed balances are always computed from the ledgers.
const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    balance REAL DEFAULT 0,
    budget REAL
)"#;

const INCOMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS incomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    amount REAL,
    description TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users (user_id)
)"#;

const EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    amount REAL,
    description TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users (user_id)
)"#;

/// Nothing enforces one goal per user; set_goal keeps it that way.
const GOALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    goal TEXT,
    amount REAL,
    FOREIGN KEY (user_id) REFERENCES users (user_id)
)"#;

const CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expense_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    category_name TEXT
)"#;

const BUDGETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS budgets (
    user_id INTEGER PRIMARY KEY,
    budget REAL
)"#;

const SCHEMA: &[&str] = &[
    USERS_TABLE,
    INCOMES_TABLE,
    EXPENSES_TABLE,
    GOALS_TABLE,
    CATEGORIES_TABLE,
    BUDGETS_TABLE,
];

fn repo_err(e: libsql::Error) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// Read a numeric column. SQLite may hand back INTEGER for whole numbers and NULL for unset cells.
fn real_at(row: &Row, idx: i32) -> Result<f64, DomainError> {
    match row.get_value(idx).map_err(repo_err)? {
        Value::Real(v) => Ok(v),
        Value::Integer(v) => Ok(v as f64),
        Value::Null => Ok(0.0),
        other => Err(DomainError::Repo(format!(
            "column {} is not numeric: {:?}",
            idx, other
        ))),
    }
}

fn text_at(row: &Row, idx: i32) -> Result<String, DomainError> {
    match row.get_value(idx).map_err(repo_err)? {
        Value::Text(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Integer(v) => Ok(v.to_string()),
        Value::Real(v) => Ok(v.to_string()),
        Value::Blob(b) => Ok(String::from_utf8_lossy(&b).into_owned()),
    }
}

/// SQLite finance store. One database file (e.g. finance.db).
pub struct SqliteRepo {
    /// Kept alive for the lifetime of `conn`.
    _db: Database,
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Open (or create) the database file and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DomainError::Repo(e.to_string()))?;
        }
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(repo_err)?.is_some() {}
        }

        Self::init_schema(&conn).await?;

        let abs_path = db_path.canonicalize().unwrap_or_else(|_| db_path.clone());
        info!(path = %abs_path.display(), "SQLite finance store opened with WAL mode");

        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Private in-memory database. Lives as long as the repo.
    pub async fn open_in_memory() -> Result<Self, DomainError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;
        Self::init_schema(&conn).await?;
        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    async fn init_schema(conn: &Connection) -> Result<(), DomainError> {
        for ddl in SCHEMA {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn sum_since(
        conn: &Connection,
        table: &str,
        user_id: UserId,
        since: &str,
    ) -> Result<f64, DomainError> {
        let sql = format!(
            "SELECT TOTAL(amount) FROM {} WHERE user_id = ?1 AND timestamp >= ?2",
            table
        );
        let mut rows = conn
            .query(&sql, params![user_id, since])
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => real_at(&row, 0),
            None => Ok(0.0),
        }
    }
}

fn ledger_table(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Income => "incomes",
        EntryKind::Expense => "expenses",
    }
}

#[async_trait::async_trait]
impl FinanceRepo for SqliteRepo {
    async fn record_entry(&self, entry: &LedgerEntry) -> Result<(), DomainError> {
        let timestamp = entry.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let signed = entry.kind.signed(entry.amount);

        let conn = self.conn.lock().await;
        let tx = conn.transaction().await.map_err(repo_err)?;

        // User row first: ledger rows reference it.
        tx.execute(
            r#"
            INSERT INTO users (user_id, balance) VALUES (?1, ?2)
            ON CONFLICT (user_id) DO UPDATE SET balance = balance + excluded.balance
            "#,
            params![entry.user_id, signed],
        )
        .await
        .map_err(repo_err)?;

        let insert = format!(
            "INSERT INTO {} (user_id, amount, description, timestamp) VALUES (?1, ?2, ?3, ?4)",
            ledger_table(entry.kind)
        );
        tx.execute(
            &insert,
            params![
                entry.user_id,
                entry.amount,
                entry.description.as_str(),
                timestamp.as_str()
            ],
        )
        .await
        .map_err(repo_err)?;

        // Income creates the budget row; expense only touches an existing one.
        match entry.kind {
            EntryKind::Income => {
                tx.execute(
                    r#"
                    INSERT INTO budgets (user_id, budget) VALUES (?1, ?2)
                    ON CONFLICT (user_id) DO UPDATE SET budget = budget + excluded.budget
                    "#,
                    params![entry.user_id, entry.amount],
                )
                .await
                .map_err(repo_err)?;
            }
            EntryKind::Expense => {
                tx.execute(
                    "UPDATE budgets SET budget = budget - ?1 WHERE user_id = ?2",
                    params![entry.amount, entry.user_id],
                )
                .await
                .map_err(repo_err)?;
            }
        }

        // Goal amount is what is still missing: income shrinks it, expense grows it.
        tx.execute(
            "UPDATE goals SET amount = amount - ?1 WHERE user_id = ?2",
            params![signed, entry.user_id],
        )
        .await
        .map_err(repo_err)?;

        tx.commit().await.map_err(repo_err)?;
        debug!(
            user_id = entry.user_id,
            kind = ?entry.kind,
            amount = entry.amount,
            "ledger entry recorded"
        );
        Ok(())
    }

    async fn balance(&self, user_id: UserId) -> Result<f64, DomainError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                r#"
                SELECT
                    (SELECT TOTAL(amount) FROM incomes WHERE user_id = ?1) -
                    (SELECT TOTAL(amount) FROM expenses WHERE user_id = ?1)
                "#,
                params![user_id],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => real_at(&row, 0),
            None => Ok(0.0),
        }
    }

    async fn totals_since(
        &self,
        user_id: UserId,
        since: NaiveDateTime,
    ) -> Result<PeriodTotals, DomainError> {
        let since = since.format(TIMESTAMP_FORMAT).to_string();
        let conn = self.conn.lock().await;
        let income = Self::sum_since(&conn, "incomes", user_id, &since).await?;
        let expenses = Self::sum_since(&conn, "expenses", user_id, &since).await?;
        Ok(PeriodTotals { income, expenses })
    }

    async fn set_budget(&self, user_id: UserId, amount: f64) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, budget) VALUES (?1, ?2)
            ON CONFLICT (user_id) DO UPDATE SET budget = excluded.budget
            "#,
            params![user_id, amount],
        )
        .await
        .map_err(repo_err)?;
        Ok(())
    }

    async fn budget(&self, user_id: UserId) -> Result<Option<f64>, DomainError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT budget FROM budgets WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(repo_err)?;
        if let Some(row) = rows.next().await.map_err(repo_err)? {
            Ok(Some(real_at(&row, 0)?))
        } else {
            Ok(None)
        }
    }

    async fn set_goal(&self, user_id: UserId, name: &str, amount: f64) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        let tx = conn.transaction().await.map_err(repo_err)?;
        // goals references users; a goal may come before any transaction.
        tx.execute(
            "INSERT INTO users (user_id) VALUES (?1) ON CONFLICT (user_id) DO NOTHING",
            params![user_id],
        )
        .await
        .map_err(repo_err)?;
        let existing: i64 = {
            let mut rows = tx
                .query(
                    "SELECT COUNT(*) FROM goals WHERE user_id = ?1",
                    params![user_id],
                )
                .await
                .map_err(repo_err)?;
            match rows.next().await.map_err(repo_err)? {
                Some(row) => row.get(0).map_err(repo_err)?,
                None => 0,
            }
        };
        if existing > 0 {
            tx.execute(
                "UPDATE goals SET goal = ?1, amount = ?2 WHERE user_id = ?3",
                params![name, amount, user_id],
            )
            .await
            .map_err(repo_err)?;
        } else {
            tx.execute(
                "INSERT INTO goals (user_id, goal, amount) VALUES (?1, ?2, ?3)",
                params![user_id, name, amount],
            )
            .await
            .map_err(repo_err)?;
        }
        tx.commit().await.map_err(repo_err)?;
        Ok(())
    }

    async fn goals(&self, user_id: UserId) -> Result<Vec<Goal>, DomainError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT goal, amount FROM goals WHERE user_id = ?1 ORDER BY id",
                params![user_id],
            )
            .await
            .map_err(repo_err)?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            goals.push(Goal {
                name: text_at(&row, 0)?,
                amount: real_at(&row, 1)?,
            });
        }
        Ok(goals)
    }

    async fn add_category(&self, user_id: UserId, name: &str) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO expense_categories (user_id, category_name) VALUES (?1, ?2)",
            params![user_id, name],
        )
        .await
        .map_err(repo_err)?;
        Ok(())
    }

    async fn delete_category(&self, user_id: UserId, name: &str) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM expense_categories WHERE user_id = ?1 AND category_name = ?2",
            params![user_id, name],
        )
        .await
        .map_err(repo_err)
    }

    async fn categories(&self, user_id: UserId) -> Result<Vec<Category>, DomainError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT category_name FROM expense_categories WHERE user_id = ?1 ORDER BY id",
                params![user_id],
            )
            .await
            .map_err(repo_err)?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            categories.push(Category {
                name: text_at(&row, 0)?,
            });
        }
        Ok(categories)
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

    fn entry(user_id: UserId, kind: EntryKind, amount: f64, ts: NaiveDateTime) -> LedgerEntry {
        LedgerEntry {
            user_id,
            kind,
            amount,
            description: String::new(),
            timestamp: ts,
        }
    }

    async fn user_balance_column(repo: &SqliteRepo, user_id: UserId) -> Option<f64> {
        let conn = repo.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT balance FROM users WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .unwrap();
        rows.next()
            .await
            .unwrap()
            .map(|row| real_at(&row, 0).unwrap())
    }

    #[tokio::test]
    async fn test_balance_is_signed_ledger_sum() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        let ts = at(2024, 5, 1, 12, 0);
        assert_eq!(repo.balance(7).await.unwrap(), 0.0);

        repo.record_entry(&entry(7, EntryKind::Income, 500.0, ts))
            .await
            .unwrap();
        repo.record_entry(&entry(7, EntryKind::Expense, 120.5, ts))
            .await
            .unwrap();
        repo.record_entry(&entry(7, EntryKind::Income, 20.0, ts))
            .await
            .unwrap();
        repo.record_entry(&entry(8, EntryKind::Expense, 99.0, ts))
            .await
            .unwrap();

        assert_eq!(repo.balance(7).await.unwrap(), 399.5);
        assert_eq!(repo.balance(8).await.unwrap(), -99.0);
        // cached column tracks the same figure
        assert_eq!(user_balance_column(&repo, 7).await, Some(399.5));
    }

    #[tokio::test]
    async fn test_budget_asymmetry() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        let ts = at(2024, 5, 1, 12, 0);

        // expense without a budget row leaves it absent
        repo.record_entry(&entry(1, EntryKind::Expense, 50.0, ts))
            .await
            .unwrap();
        assert_eq!(repo.budget(1).await.unwrap(), None);

        // income creates it
        repo.record_entry(&entry(1, EntryKind::Income, 30.0, ts))
            .await
            .unwrap();
        assert_eq!(repo.budget(1).await.unwrap(), Some(30.0));

        repo.set_budget(1, 1000.0).await.unwrap();
        assert_eq!(repo.budget(1).await.unwrap(), Some(1000.0));
        repo.record_entry(&entry(1, EntryKind::Income, 200.0, ts))
            .await
            .unwrap();
        repo.record_entry(&entry(1, EntryKind::Expense, 150.0, ts))
            .await
            .unwrap();
        assert_eq!(repo.budget(1).await.unwrap(), Some(1050.0));
    }

    #[tokio::test]
    async fn test_goal_overwrite_and_adjustment() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        let ts = at(2024, 5, 1, 12, 0);

        repo.set_goal(3, "car", 10000.0).await.unwrap();
        repo.set_goal(3, "house", 50000.0).await.unwrap();
        let goals = repo.goals(3).await.unwrap();
        assert_eq!(
            goals,
            vec![Goal {
                name: "house".into(),
                amount: 50000.0
            }]
        );

        repo.record_entry(&entry(3, EntryKind::Income, 1000.0, ts))
            .await
            .unwrap();
        repo.record_entry(&entry(3, EntryKind::Expense, 250.0, ts))
            .await
            .unwrap();
        assert_eq!(repo.goals(3).await.unwrap()[0].amount, 49250.0);
        assert!(repo.goals(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_before_any_transaction_on_file_db() {
        let dir = std::env::temp_dir().join(format!("finance-bot-goal-{}", std::process::id()));
        let path = dir.join("finance.db");
        let repo = SqliteRepo::open(&path).await.unwrap();

        repo.set_goal(11, "car", 10000.0).await.unwrap();
        assert_eq!(user_balance_column(&repo, 11).await, Some(0.0));
        repo.record_entry(&entry(11, EntryKind::Income, 1000.0, at(2024, 5, 1, 12, 0)))
            .await
            .unwrap();
        assert_eq!(
            repo.goals(11).await.unwrap(),
            vec![Goal {
                name: "car".into(),
                amount: 9000.0
            }]
        );
        assert_eq!(repo.balance(11).await.unwrap(), 1000.0);

        drop(repo);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_failed_entry_leaves_nothing_behind() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        let ts = at(2024, 5, 1, 12, 0);
        repo.set_goal(5, "car", 10000.0).await.unwrap();
        repo.record_entry(&entry(5, EntryKind::Income, 100.0, ts))
            .await
            .unwrap();
        {
            let conn = repo.conn.lock().await;
            conn.execute(
                r#"
                CREATE TRIGGER goals_locked BEFORE UPDATE ON goals
                BEGIN SELECT RAISE(ABORT, 'goals locked'); END
                "#,
                (),
            )
            .await
            .unwrap();
        }

        let result = repo
            .record_entry(&entry(5, EntryKind::Expense, 40.0, ts))
            .await;
        assert!(matches!(result, Err(DomainError::Repo(msg)) if msg.contains("goals locked")));

        // ledger, cached balance, budget and goal are all as before the failed command
        assert_eq!(repo.balance(5).await.unwrap(), 100.0);
        assert_eq!(user_balance_column(&repo, 5).await, Some(100.0));
        assert_eq!(repo.budget(5).await.unwrap(), Some(100.0));
        assert_eq!(repo.goals(5).await.unwrap()[0].amount, 9900.0);
        let since = at(2024, 1, 1, 0, 0);
        assert_eq!(repo.totals_since(5, since).await.unwrap().expenses, 0.0);
    }

    #[tokio::test]
    async fn test_totals_since_window() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        repo.record_entry(&entry(1, EntryKind::Income, 100.0, at(2024, 5, 1, 9, 0)))
            .await
            .unwrap();
        repo.record_entry(&entry(1, EntryKind::Income, 40.0, at(2024, 5, 10, 0, 0)))
            .await
            .unwrap();
        repo.record_entry(&entry(1, EntryKind::Expense, 15.0, at(2024, 5, 10, 23, 59)))
            .await
            .unwrap();
        repo.record_entry(&entry(2, EntryKind::Income, 999.0, at(2024, 5, 10, 12, 0)))
            .await
            .unwrap();

        let totals = repo.totals_since(1, at(2024, 5, 10, 0, 0)).await.unwrap();
        assert_eq!(
            totals,
            PeriodTotals {
                income: 40.0,
                expenses: 15.0
            }
        );
        let empty = repo.totals_since(1, at(2024, 6, 1, 0, 0)).await.unwrap();
        assert_eq!(empty, PeriodTotals::default());
    }

    #[tokio::test]
    async fn test_categories_duplicates_and_delete() {
        let repo = SqliteRepo::open_in_memory().await.unwrap();
        repo.add_category(1, "food").await.unwrap();
        repo.add_category(1, "food").await.unwrap();
        repo.add_category(1, "rent").await.unwrap();
        repo.add_category(2, "food").await.unwrap();

        let names: Vec<String> = repo
            .categories(1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["food", "food", "rent"]);

        assert_eq!(repo.delete_category(1, "food").await.unwrap(), 2);
        assert_eq!(repo.delete_category(1, "missing").await.unwrap(), 0);
        assert_eq!(repo.categories(1).await.unwrap().len(), 1);
        assert_eq!(repo.categories(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_file_persists() {
        let dir = std::env::temp_dir().join(format!("finance-bot-test-{}", std::process::id()));
        let path = dir.join("nested").join("finance.db");
        {
            let repo = SqliteRepo::open(&path).await.unwrap();
            repo.set_budget(1, 42.0).await.unwrap();
            assert_eq!(repo.path(), path.as_path());
        }
        let reopened = SqliteRepo::open(&path).await.unwrap();
        assert_eq!(reopened.budget(1).await.unwrap(), Some(42.0));
        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

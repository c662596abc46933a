//! Persistence adapters. Implement FinanceRepo.

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;

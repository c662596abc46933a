//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the chat command grammar, and business rules live here. Dependencies flow inward.

pub mod command;
pub mod entities;
pub mod errors;
pub mod money;

pub use command::{Command, CommandKind};
pub use entities::{
    Category, EntryKind, Goal, LedgerEntry, Period, PeriodTotals, TIMESTAMP_FORMAT, UserId,
};
pub use errors::DomainError;

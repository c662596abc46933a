//! Infrastructure adapters. Implement ports.
//!
//! SQLite store, Telegram bot, console chat, system clock. Map errors to DomainError.

pub mod clock;
pub mod persistence;
pub mod telegram;
pub mod ui;

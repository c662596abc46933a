//! Telegram adapter. Bot front-end over MTProto (grammers).

pub mod bot;

pub use bot::TelegramBot;

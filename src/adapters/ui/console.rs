//! Implements InputPort as a local console chat. Inquire-based prompt loop.
//!
//! Acts as a single configured user. The leading `/` of commands is optional here.

use crate::domain::{DomainError, UserId};
use crate::ports::InputPort;
use crate::usecases::CommandDispatcher;
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetForegroundColor};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{InquireError, Text};
use std::io::{Write, stdout};
use std::sync::Arc;
use tracing::info;

const UNKNOWN_COMMAND_HINT: &str = "Неизвестная команда. Используйте /help.";

/// Applies the console theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("₽").with_fg(Color::LightGreen))
        .with_answered_prompt_prefix(Styled::new("›").with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

/// Console chat adapter.
pub struct ConsoleChat {
    user_id: UserId,
    dispatcher: Arc<CommandDispatcher>,
}

impl ConsoleChat {
    pub fn new(user_id: UserId, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            user_id,
            dispatcher,
        }
    }
}

/// Turn console input into a chat message: `balance` and `/balance` are the same command.
fn to_message(line: &str) -> String {
    if line.starts_with('/') {
        line.to_string()
    } else {
        format!("/{}", line)
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit")
}

fn print_reply(text: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(TermColor::Green));
    for line in text.lines() {
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
    }
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[async_trait]
impl InputPort for ConsoleChat {
    async fn run(&self) -> Result<(), DomainError> {
        info!(user_id = self.user_id, "console chat started");
        loop {
            // inquire blocks on stdin; keep it off the async workers
            let input = tokio::task::spawn_blocking(|| {
                Text::new("")
                    .with_placeholder("help")
                    .with_help_message("/help for commands, exit to quit")
                    .prompt()
            })
            .await
            .map_err(|e| DomainError::Chat(e.to_string()))?;

            let line = match input {
                Ok(line) => line,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(e) => return Err(DomainError::Chat(e.to_string())),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_exit(line) {
                break;
            }

            match self.dispatcher.dispatch(self.user_id, &to_message(line)).await {
                Some(reply) => print_reply(&reply),
                None => print_reply(UNKNOWN_COMMAND_HINT),
            }
        }
        info!("console chat closed");
        Ok(())
    }
}

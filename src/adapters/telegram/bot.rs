//! Implements InputPort as a Telegram bot using grammers Client.
//!
//! Signs in with a bot token over MTProto, then answers each new incoming message in
//! arrival order. The session file keeps authorization and update state across restarts.

use crate::domain::DomainError;
use crate::ports::InputPort;
use crate::shared::config::BotCredentials;
use crate::usecases::CommandDispatcher;
use async_trait::async_trait;
use grammers_client::client::UpdatesConfiguration;
use grammers_client::update::Update;
use grammers_client::{Client, SenderPool};
use grammers_session::storages::SqliteSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Telegram bot front-end. Owns nothing but credentials until `run` connects.
pub struct TelegramBot {
    credentials: BotCredentials,
    session_path: PathBuf,
    dispatcher: Arc<CommandDispatcher>,
}

impl TelegramBot {
    pub fn new(
        credentials: BotCredentials,
        session_path: impl AsRef<Path>,
        dispatcher: Arc<CommandDispatcher>,
    ) -> Self {
        Self {
            credentials,
            session_path: session_path.as_ref().to_path_buf(),
            dispatcher,
        }
    }

    /// Opens the persistent session storage. Parent directories are created as needed.
    async fn open_session(&self) -> Result<SqliteSession, DomainError> {
        if let Some(parent) = self
            .session_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Chat(format!("create session directory: {}", e)))?;
        }
        SqliteSession::open(&self.session_path)
            .await
            .map_err(|e| DomainError::Chat(format!("open session file: {}", e)))
    }

    /// Answer one update. Anything that is not a new incoming text command is ignored.
    async fn handle_update(&self, update: Update) -> Result<(), DomainError> {
        let Update::NewMessage(message) = update else {
            return Ok(());
        };
        if message.outgoing() {
            return Ok(());
        }
        let Some(user_id) = message.sender().map(|p| p.id().bot_api_dialog_id()) else {
            debug!("message without sender, skipping");
            return Ok(());
        };
        let Some(reply) = self.dispatcher.dispatch(user_id, message.text()).await else {
            return Ok(());
        };
        message
            .reply(reply.as_str())
            .await
            .map_err(|e| DomainError::Chat(format!("send reply: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl InputPort for TelegramBot {
    async fn run(&self) -> Result<(), DomainError> {
        let session = Arc::new(self.open_session().await?);
        let SenderPool {
            runner,
            updates,
            handle,
        } = SenderPool::new(session, self.credentials.api_id);
        let runner_task = tokio::spawn(async move {
            runner.run().await;
        });
        let client = Client::new(handle);

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| DomainError::Chat(e.to_string()))?;
        if !authorized {
            info!("signing in as bot");
            client
                .bot_sign_in(&self.credentials.token, &self.credentials.api_hash)
                .await
                .map_err(|e| DomainError::Chat(format!("bot sign in: {}", e)))?;
        }
        info!(session = %self.session_path.display(), "bot is online; press Ctrl-C to stop");

        let mut stream = client
            .stream_updates(
                updates,
                UpdatesConfiguration {
                    catch_up: false,
                    ..Default::default()
                },
            )
            .await;

        // Updates are handled one at a time so the store sees commands in arrival order.
        let result = loop {
            let update = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received, stopping bot");
                    break Ok(());
                }
                update = stream.next() => update,
            };
            match update {
                Ok(update) => {
                    if let Err(e) = self.handle_update(update).await {
                        warn!(error = %e, "failed to answer message");
                    }
                }
                Err(e) => break Err(DomainError::Chat(format!("update stream: {}", e))),
            }
        };

        runner_task.abort();
        result
    }
}

//! Wiring & DI. Entry point: open the store, build services, run a chat front-end.
//! No business logic here.

use dotenv::dotenv;
use finance_bot::adapters::clock::SystemClock;
use finance_bot::adapters::persistence::SqliteRepo;
use finance_bot::adapters::telegram::TelegramBot;
use finance_bot::adapters::ui::console::ConsoleChat;
use finance_bot::ports::{Clock, FinanceRepo, InputPort};
use finance_bot::shared::config::AppConfig;
use finance_bot::usecases::{CommandDispatcher, FinanceService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config load failed, using defaults");
            AppConfig::default()
        }
    };

    // --- Store: opened once, shared by every handler, dropped on shutdown ---
    let database_path = cfg.database_path_or_default();
    let sqlite_repo = Arc::new(
        SqliteRepo::open(&database_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite open failed: {}", e))?,
    );
    let repo: Arc<dyn FinanceRepo> = Arc::clone(&sqlite_repo) as Arc<dyn FinanceRepo>;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- Services ---
    let finance = Arc::new(FinanceService::new(repo, clock));
    let dispatcher = Arc::new(CommandDispatcher::new(finance));

    // --- Front-end: Telegram bot when fully configured, console chat otherwise ---
    let input_port: Arc<dyn InputPort> = match cfg.bot_credentials() {
        Some(credentials) => {
            info!(api_id = credentials.api_id, "Telegram bot mode");
            Arc::new(TelegramBot::new(
                credentials,
                cfg.session_path_or_default(),
                Arc::clone(&dispatcher),
            ))
        }
        None => {
            warn!("FINBOT_BOT_TOKEN / FINBOT_API_ID / FINBOT_API_HASH not set, using console chat");
            finance_bot::adapters::ui::init_ui();
            Arc::new(ConsoleChat::new(
                cfg.console_user_id_or_default(),
                Arc::clone(&dispatcher),
            ))
        }
    };

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    drop(input_port);
    drop(dispatcher);
    info!(path = %sqlite_repo.path().display(), "closing finance store");
    Ok(())
}

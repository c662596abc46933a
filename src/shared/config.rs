//! Application configuration. Bot credentials, paths.

use serde::Deserialize;

/// Database file used when FINBOT_DATABASE_PATH is not set.
pub const DEFAULT_DATABASE_PATH: &str = "finance.db";

/// grammers session file used when FINBOT_SESSION_PATH is not set.
pub const DEFAULT_SESSION_PATH: &str = "finbot.session";

/// User id the console chat acts as when FINBOT_CONSOLE_USER_ID is not set.
pub const DEFAULT_CONSOLE_USER_ID: i64 = 1;

/// Credentials for the bot account. api_id/api_hash come from https://my.telegram.org.
#[derive(Debug, Clone)]
pub struct BotCredentials {
    pub api_id: i32,
    pub api_hash: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bot token from @BotFather. Read from FINBOT_BOT_TOKEN.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// MTProto api_id from https://my.telegram.org. Read from FINBOT_API_ID.
    #[serde(default)]
    pub api_id: Option<i32>,

    /// MTProto api_hash. Read from FINBOT_API_HASH.
    #[serde(default)]
    pub api_hash: Option<String>,

    /// SQLite database file. Read from FINBOT_DATABASE_PATH.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Bot session file. Read from FINBOT_SESSION_PATH.
    #[serde(default)]
    pub session_path: Option<String>,

    /// User id for the console chat. Read from FINBOT_CONSOLE_USER_ID.
    #[serde(default)]
    pub console_user_id: Option<i64>,
}

impl AppConfig {
    /// Environment (FINBOT_*) plus an optional file named by FINBOT_CONFIG.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("FINBOT"));
        if let Ok(path) = std::env::var("FINBOT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Numeric ids come in as strings from the environment; parse them explicitly.
        if let Ok(s) = std::env::var("FINBOT_API_ID") {
            if let Ok(id) = s.trim().parse::<i32>() {
                cfg.api_id = Some(id);
            }
        }
        if let Ok(s) = std::env::var("FINBOT_CONSOLE_USER_ID") {
            if let Ok(id) = s.trim().parse::<i64>() {
                cfg.console_user_id = Some(id);
            }
        }
        Ok(cfg)
    }

    /// Returns the database path. Defaults to DEFAULT_DATABASE_PATH.
    pub fn database_path_or_default(&self) -> String {
        self.database_path
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
    }

    /// Returns the session path. Defaults to DEFAULT_SESSION_PATH.
    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string())
    }

    pub fn console_user_id_or_default(&self) -> i64 {
        self.console_user_id.unwrap_or(DEFAULT_CONSOLE_USER_ID)
    }

    /// Bot credentials when token, api_id and api_hash are all present and non-empty.
    pub fn bot_credentials(&self) -> Option<BotCredentials> {
        let token = self.bot_token.clone().filter(|s| !s.trim().is_empty())?;
        let api_hash = self.api_hash.clone().filter(|s| !s.trim().is_empty())?;
        let api_id = self.api_id.filter(|&id| id != 0)?;
        Some(BotCredentials {
            api_id,
            api_hash,
            token,
        })
    }
}

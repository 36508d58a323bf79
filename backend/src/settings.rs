use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub snow_particles: Option<usize>,
}

impl Settings {
    /// Reads settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .ok_or_else(|| anyhow!("PORT is not set"))?
            .parse::<u16>()
            .context("PORT must be a port number")?;
        let frontend_dir = lookup("FRONTEND_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("FRONTEND_DIR is not set"))?;

        // Telegram credentials stay optional; the webhook answers 500 without them.
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let snow_particles = non_empty("SNOW_PARTICLES")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("SNOW_PARTICLES must be a whole number")?;

        Ok(Self {
            port,
            frontend_dir,
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
            telegram_api_base: non_empty("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            snow_particles,
        })
    }
}

use anyhow::Result;
use serde::Deserialize;
use std::env;

use crate::services::rate_limiter::DEFAULT_DAILY_LIMIT;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Unset means the process keeps its state in memory.
    pub redis_url: Option<String>,
    pub port: u16,
    pub daily_limit: u32,
    pub cookie_secure: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            redis_url: None,
            port: 3000,
            daily_limit: DEFAULT_DAILY_LIMIT,
            cookie_secure: false,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            // A malformed limit falls back to the default instead of refusing to start.
            daily_limit: env::var("DAILY_LIMIT")
                .ok()
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(DEFAULT_DAILY_LIMIT),
            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

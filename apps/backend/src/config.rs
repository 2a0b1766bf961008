//! Environment configuration

use anyhow::{bail, Context};
use chrono::NaiveDate;

/// Default number of cards handed out per review session.
pub const DEFAULT_SESSION_LIMIT: usize = 50;

/// Upper bound for the `limit` query parameter.
pub const MAX_SESSION_LIMIT: usize = 200;

/// Backend configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Hour (UTC, 0-23) at which a new study day begins.
    pub daily_reset_hour: u32,
}

impl Config {
    /// Load from process environment (after `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        let daily_reset_hour = match get("DAILY_RESET_HOUR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DAILY_RESET_HOUR is not a number: {raw}"))?,
            None => 0,
        };
        if daily_reset_hour > 23 {
            bail!("DAILY_RESET_HOUR must be between 0 and 23, got {daily_reset_hour}");
        }

        Ok(Self {
            database_url,
            host,
            port,
            daily_reset_hour,
        })
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Study day used for due selection and scheduling.
    pub fn today(&self) -> NaiveDate {
        recall_core::study_day::today(self.daily_reset_hour)
    }
}

use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub users_source: String,
    pub cors_origin: String,
    pub seed_books: bool,
    pub task_delete_delay: Duration,
    pub countdown_period: Duration,
    pub contact: SubmissionTimings,
}

/// Fixed pauses of the simulated contact form submission.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionTimings {
    pub submit: Duration,
    pub reset: Duration,
    pub notice: Duration,
}

impl Default for SubmissionTimings {
    fn default() -> Self {
        Self {
            submit: Duration::from_millis(1500),
            reset: Duration::from_millis(1500),
            notice: Duration::from_millis(2500),
        }
    }
}

impl SubmissionTimings {
    pub fn instant() -> Self {
        Self {
            submit: Duration::ZERO,
            reset: Duration::ZERO,
            notice: Duration::ZERO,
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            info!("Loaded .env file");
        }

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3000")?,
            database_url: try_load("DATABASE_URL", "sqlite://tasks.db")?,
            users_source: try_load("USERS_SOURCE", "./data.json")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:3000")?,
            seed_books: try_load("SEED_BOOKS", "true")?,
            task_delete_delay: millis("TASK_DELETE_DELAY_MS", "500")?,
            countdown_period: millis("COUNTDOWN_PERIOD_MS", "1000")?,
            contact: SubmissionTimings {
                submit: millis("CONTACT_SUBMIT_DELAY_MS", "1500")?,
                reset: millis("CONTACT_RESET_DELAY_MS", "1500")?,
                notice: millis("CONTACT_NOTICE_MS", "2500")?,
            },
        })
    }

    /// In-memory configuration with every delay set to zero and a fast countdown tick.
    pub fn for_tests(users_source: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            users_source: users_source.into(),
            cors_origin: "http://localhost:3000".to_string(),
            seed_books: true,
            task_delete_delay: Duration::ZERO,
            countdown_period: Duration::from_millis(20),
            contact: SubmissionTimings::instant(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

fn millis(key: &'static str, default: &str) -> Result<Duration, ConfigError> {
    try_load::<u64>(key, default).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparsable_values() {
        env::set_var("WEBTASKS_TEST_PORT", "not-a-port");
        let err = try_load::<u16>("WEBTASKS_TEST_PORT", "3000").unwrap_err();
        assert!(err.to_string().contains("WEBTASKS_TEST_PORT"));
        env::remove_var("WEBTASKS_TEST_PORT");
    }

    #[test]
    fn falls_back_to_default() {
        let delay = millis("WEBTASKS_TEST_UNSET_DELAY", "250").unwrap();
        assert_eq!(delay, Duration::from_millis(250));
    }
}

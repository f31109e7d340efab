use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub mail_webhook_url: Option<String>,
    pub mail_webhook_secret: Option<String>,
    pub view_dedup_window_minutes: i64,
    pub recommendation_limit: usize,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            other => Err(format!("expected json or pretty, got {}", other)),
        }
    }
}

/// Runtime knobs the services read; separate from [`Config`] so state can be
/// built without touching the environment.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub view_dedup_window: chrono::Duration,
    pub recommendation_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_dedup_window: chrono::Duration::minutes(60),
            recommendation_limit: 4,
        }
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            view_dedup_window: chrono::Duration::minutes(config.view_dedup_window_minutes),
            recommendation_limit: config.recommendation_limit,
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let view_dedup_window_minutes: i64 = get_env_parse_or("VIEW_DEDUP_WINDOW_MINUTES", 60)?;
        if view_dedup_window_minutes <= 0 {
            return Err(Error::Config(
                "VIEW_DEDUP_WINDOW_MINUTES must be positive".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
            jwt_secret: get_env("JWT_SECRET")?,
            mail_webhook_url: get_env_opt("MAIL_WEBHOOK_URL"),
            mail_webhook_secret: get_env_opt("MAIL_WEBHOOK_SECRET"),
            view_dedup_window_minutes,
            recommendation_limit: get_env_parse_or("RECOMMENDATION_LIMIT", 4)?,
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    get_config()
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_values() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn settings_follow_config() {
        let config = Config {
            server_address: "127.0.0.1:0".into(),
            database_url: "postgres://localhost/jobs".into(),
            database_max_connections: 5,
            jwt_secret: "secret".into(),
            mail_webhook_url: None,
            mail_webhook_secret: None,
            view_dedup_window_minutes: 15,
            recommendation_limit: 8,
            log_format: LogFormat::Pretty,
        };
        let settings = Settings::from(&config);
        assert_eq!(settings.view_dedup_window, chrono::Duration::minutes(15));
        assert_eq!(settings.recommendation_limit, 8);
    }
}

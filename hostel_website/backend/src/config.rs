use std::{env, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// MongoDB URI, rooms stay in memory without it
    pub database_url: Option<String>,
    pub database_name: String,
    pub admin_token: Option<String>,
    pub front_path: Option<String>,
    pub seed_rooms: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse("PORT", non_empty("PORT"), 8080)?,
            database_url: non_empty("DATABASE_URL"),
            database_name: non_empty("DATABASE_NAME").unwrap_or_else(|| "hostel".to_string()),
            admin_token: non_empty("ADMIN_TOKEN"),
            front_path: non_empty("FRONT_PATH"),
            seed_rooms: parse("SEED_ROOMS", non_empty("SEED_ROOMS"), false)?,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}

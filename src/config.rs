use crate::overdue::{OverdueThresholds, DEFAULT_WARNING_DAYS};
use std::{env, fmt, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown APP_ENV value: {0} (expected 'production' or 'test')")]
    UnknownEnvironment(String),

    #[error("invalid value for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Which data set the server works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Test,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::UnknownEnvironment(value.to_string())),
        }
    }

    pub fn default_data_path(self) -> PathBuf {
        match self {
            Self::Production => PathBuf::from("data/insurers.json"),
            Self::Test => PathBuf::from("data/environments/insurers.test.json"),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Test => f.write_str("test"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub data_path: PathBuf,
    pub port: u16,
    pub thresholds: OverdueThresholds,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::default(),
        };
        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| environment.default_data_path());
        let port = parse_number(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let warning_days =
            parse_number(&lookup, "OVERDUE_WARNING_DAYS")?.unwrap_or(DEFAULT_WARNING_DAYS);

        Ok(Self {
            environment,
            data_path,
            port,
            thresholds: OverdueThresholds { warning_days },
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { key, value })
        })
        .transpose()
}

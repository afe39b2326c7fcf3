use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:4200";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where tasks are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

impl StorageMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageMode::Postgres => "postgres",
            StorageMode::InMemory => "in_memory",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageMode::Postgres),
            "in_memory" | "memory" => Ok(StorageMode::InMemory),
            other => Err(format!("expected 'postgres' or 'in_memory', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_mode: StorageMode,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let storage_mode = parse_or("STORAGE_MODE", lookup("STORAGE_MODE"), StorageMode::Postgres)?;
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_mode == StorageMode::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            host,
            port,
            storage_mode,
            database_url,
            max_connections,
            allowed_origins,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

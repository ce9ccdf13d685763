use std::path::PathBuf;

use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_list_env, parse_u32_env, require_env};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub thread_store: ThreadStoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub migrations_dir: PathBuf,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

/// Loads `.env` from the working directory or its parents. A missing file is
/// not an error; an unreadable or malformed one is.
pub fn load_dotenv() -> Result<(), ConfigError> {
    dotenv_outcome(dotenvy::dotenv().map(|_| ()))
}

fn dotenv_outcome(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let thread_store = parse_thread_store_backend()?;
        let database_url = match thread_store {
            ThreadStoreBackend::Postgres => Some(require_env("DATABASE_URL")?),
            ThreadStoreBackend::Memory => optional_trimmed_env("DATABASE_URL"),
        };

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            thread_store,
            database_url,
            database_max_connections: parse_u32_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
            migrations_dir: optional_trimmed_env("MIGRATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
                }),
            cors_allowed_origins: parse_list_env("CORS_ALLOWED_ORIGINS"),
            log_format: parse_log_format()?,
        })
    }
}

fn parse_thread_store_backend() -> Result<ThreadStoreBackend, ConfigError> {
    match optional_trimmed_env("THREAD_STORE")
        .map(|raw| raw.to_ascii_lowercase())
        .as_deref()
    {
        None | Some("postgres") => Ok(ThreadStoreBackend::Postgres),
        Some("memory") => Ok(ThreadStoreBackend::Memory),
        Some(other) => Err(ConfigError::InvalidConfiguration(format!(
            "THREAD_STORE must be 'postgres' or 'memory', got '{other}'"
        ))),
    }
}

fn parse_log_format() -> Result<LogFormat, ConfigError> {
    match optional_trimmed_env("LOG_FORMAT")
        .map(|raw| raw.to_ascii_lowercase())
        .as_deref()
    {
        None | Some("text") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(ConfigError::InvalidConfiguration(format!(
            "LOG_FORMAT must be 'text' or 'json', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{ConfigError, dotenv_outcome};

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let missing = dotenvy::Error::Io(io::Error::new(io::ErrorKind::NotFound, "no .env"));

        assert!(dotenv_outcome(Err(missing)).is_ok());
    }

    #[test]
    fn malformed_dotenv_file_is_reported() {
        let malformed = dotenvy::Error::LineParse("API_BIND_ADDR 0.0.0.0".to_string(), 13);

        let err = dotenv_outcome(Err(malformed)).expect_err("parse error should surface");
        assert!(matches!(err, ConfigError::Dotenv(_)));
    }
}

use thiserror::Error;

const DEFAULT_TABLE_PREFIX: &str = "langlearn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("unsupported STORE_BACKEND: {0}")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Dynamo,
    Memory,
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub table_prefix: String,
    pub store_backend: StoreBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let table_prefix = lookup("TABLE_PREFIX")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string());

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("") | Some("dynamodb") => StoreBackend::Dynamo,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            jwt_secret,
            table_prefix,
            store_backend,
        })
    }
}

use std::str::FromStr;

use reelvault_core::query::{DEFAULT_LIMIT, MAX_LIMIT};

/// How the batch importer persists validated records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// One shared transaction; each record is created inside its own
    /// savepoint so a failing record cannot poison its siblings.
    #[default]
    Savepoint,
    /// Each record gets its own transaction; attempts run concurrently.
    Independent,
}

impl PersistMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savepoint => "savepoint",
            Self::Independent => "independent",
        }
    }
}

impl FromStr for PersistMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savepoint" => Ok(Self::Savepoint),
            "independent" => Ok(Self::Independent),
            _ => Err(ConfigError::Invalid {
                var: "IMPORT_PERSIST_MODE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("QUERY_DEFAULT_LIMIT ({default}) must be between 1 and QUERY_MAX_LIMIT ({max})")]
    LimitRange { default: i64, max: i64 },
}

/// Catalog configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// SQLite connection string (default: `sqlite://reelvault.db`).
    pub database_url: String,
    /// Upper bound on pooled connections (default: `5`).
    pub max_connections: u32,
    /// Import persistence strategy (default: `savepoint`).
    pub persist_mode: PersistMode,
    /// Page size when a query gives no limit (default: `20`).
    pub default_limit: i64,
    /// Largest accepted page size (default: `100`).
    pub max_limit: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://reelvault.db".to_string(),
            max_connections: 5,
            persist_mode: PersistMode::default(),
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                 |
    /// |-----------------------|-------------------------|
    /// | `DATABASE_URL`        | `sqlite://reelvault.db` |
    /// | `DB_MAX_CONNECTIONS`  | `5`                     |
    /// | `IMPORT_PERSIST_MODE` | `savepoint`             |
    /// | `QUERY_DEFAULT_LIMIT` | `20`                    |
    /// | `QUERY_MAX_LIMIT`     | `100`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let persist_mode = match lookup("IMPORT_PERSIST_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.persist_mode,
        };
        let default_limit = parse_var(&lookup, "QUERY_DEFAULT_LIMIT", defaults.default_limit)?;
        let max_limit = parse_var(&lookup, "QUERY_MAX_LIMIT", defaults.max_limit)?;

        if default_limit < 1 || default_limit > max_limit {
            return Err(ConfigError::LimitRange {
                default: default_limit,
                max: max_limit,
            });
        }

        Ok(Self {
            database_url,
            max_connections,
            persist_mode,
            default_limit,
            max_limit,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("DATABASE_URL")?;
        let max_connections = parse_env("DB_MAX_CONNECTIONS").unwrap_or(10);
        let min_connections = parse_env("DB_MIN_CONNECTIONS").unwrap_or(1);
        let connect_timeout = parse_env("DB_CONNECT_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(8));
        let sql_logging = parse_env("DB_SQL_LOGGING").unwrap_or(false);
        Ok(Self {
            database: DbConfig {
                url,
                max_connections,
                min_connections,
                connect_timeout,
                sql_logging,
            },
        })
    }
}

/// Connection pool settings for the backing store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub sql_logging: bool,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(8),
            sql_logging: false,
        }
    }

    /// In-memory SQLite. Every pooled connection would get its own database,
    /// so the pool is pinned to a single connection.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            ..Self::new("sqlite::memory:")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn sql_logging(mut self, enabled: bool) -> Self {
        self.sql_logging = enabled;
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}

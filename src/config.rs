use crate::allocator::{DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS};
use anyhow::{Context, Result};

/// Longest short code we allow operators to configure.
const MAX_CODE_LENGTH: usize = 32;

/// Which [`LinkStore`](crate::store::LinkStore) implementation to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Durable SQLite file at `database_url`.
    Sqlite,
    /// Process-local map; everything is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store backend '{other}' (expected sqlite or memory)"),
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub store_backend: StoreBackend,

    /// SQLite connection string, e.g. "sqlite:./microlink.db"
    pub database_url: String,

    pub database_max_connections: u32,

    /// Length of generated short codes
    pub code_length: usize,

    /// Candidates tried per allocation before giving up
    pub max_allocation_attempts: u32,

    pub cors_origins: CorsOrigins,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let port = var("PORT", "8000")
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let store_backend = var("STORE_BACKEND", "sqlite")
            .parse::<StoreBackend>()
            .context("STORE_BACKEND is invalid")?;

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let code_length = var("CODE_LENGTH", &DEFAULT_CODE_LENGTH.to_string())
            .parse::<usize>()
            .context("CODE_LENGTH must be a positive integer")?;
        if !(1..=MAX_CODE_LENGTH).contains(&code_length) {
            anyhow::bail!("CODE_LENGTH must be between 1 and {MAX_CODE_LENGTH}");
        }

        let max_allocation_attempts =
            var("MAX_ALLOCATION_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())
                .parse::<u32>()
                .context("MAX_ALLOCATION_ATTEMPTS must be a positive integer")?;
        if max_allocation_attempts == 0 {
            anyhow::bail!("MAX_ALLOCATION_ATTEMPTS must be at least 1");
        }

        let cors_origins = parse_origins(&var("CORS_ALLOWED_ORIGINS", "*"));

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            store_backend,
            database_url: var("DATABASE_URL", "sqlite:./microlink.db"),
            database_max_connections,
            code_length,
            max_allocation_attempts,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_owned())
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.database_url, "sqlite:./microlink.db");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.max_allocation_attempts, 10);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("STORE_BACKEND", "Memory"),
            ("CODE_LENGTH", "8"),
            ("MAX_ALLOCATION_ATTEMPTS", "3"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example/, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.code_length, 8);
        assert_eq!(config.max_allocation_attempts, 3);
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec!["https://a.example".into(), "https://b.example".into()])
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "redis")]).is_err());
        assert!(config_from(&[("CODE_LENGTH", "0")]).is_err());
        assert!(config_from(&[("CODE_LENGTH", "33")]).is_err());
        assert!(config_from(&[("MAX_ALLOCATION_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }
}

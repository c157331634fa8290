use std::env;
use anyhow::{Context, Result};

/// The HTTP listener always binds this port on every interface.
pub const SERVER_PORT: u16 = 8080;

/// Postgres runs as the `postgres` service next to the API; the host is not configurable.
pub const DATABASE_HOST: &str = "postgres";

pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// The only browser origin advertised by the CORS headers (the front-end dev server).
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

/// Cross-origin policy advertised to browsers. It is not an authorization boundary:
/// the server answers every origin, only the response headers differ.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    pub allowed_origin: String,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allowed_origin: FRONTEND_ORIGIN.to_string(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string()],
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        database.validate()?;

        Ok(Config {
            port: SERVER_PORT,
            database,
            cors: CorsConfig::default(),
        })
    }
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup("POSTGRES_USER")
            .context("POSTGRES_USER environment variable is required")?;

        let password = lookup("POSTGRES_PASSWORD")
            .context("POSTGRES_PASSWORD environment variable is required")?;

        let database = lookup("POSTGRES_DB")
            .context("POSTGRES_DB environment variable is required")?;

        let port = match lookup("POSTGRES_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("POSTGRES_PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_DATABASE_PORT,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(DatabaseConfig {
            host: DATABASE_HOST.to_string(),
            port,
            database,
            username,
            password,
            ssl_mode: "disable".to_string(),
            max_connections,
        })
    }

    /// Rejects values that can never produce a working connection.
    /// The password is allowed to be empty (trust authentication).
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Database host cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("POSTGRES_PORT must be greater than 0");
        }

        if self.database.trim().is_empty() {
            anyhow::bail!("POSTGRES_DB cannot be empty");
        }

        if self.username.trim().is_empty() {
            anyhow::bail!("POSTGRES_USER cannot be empty");
        }

        if self.ssl_mode != "disable" {
            anyhow::bail!("Unsupported SSL mode '{}', only 'disable' is supported", self.ssl_mode);
        }

        if self.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
        }

        Ok(())
    }

    /// Key/value descriptor in libpq format. The password is masked so the result is safe to log.
    pub fn describe(&self) -> String {
        format!(
            "host={} user={} password=*** dbname={} port={} sslmode={}",
            self.host, self.username, self.database, self.port, self.ssl_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("POSTGRES_USER", "game"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "players"),
            ("POSTGRES_PORT", "5433"),
        ]
    }

    #[test]
    fn test_config_from_complete_environment() {
        let config = Config::from_lookup(lookup_from(&full_env())).expect("config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.database.host, "postgres");
        assert_eq!(config.database.username, "game");
        assert_eq!(config.database.password, "secret");
        assert_eq!(config.database.database, "players");
        assert_eq!(config.database.port, 5433);
        assert_eq!(config.database.ssl_mode, "disable");
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.cors, CorsConfig::default());
    }

    #[test]
    fn test_port_defaults_when_unset() {
        let env: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != "POSTGRES_PORT").collect();
        let config = Config::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    fn test_missing_required_variables() {
        for missing in ["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_DB"] {
            let env: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(lookup_from(&env)).unwrap_err();
            assert!(err.to_string().contains(missing), "unexpected error: {}", err);
        }
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "POSTGRES_PORT");
        env.push(("POSTGRES_PORT", "not-a-port"));
        assert!(Config::from_lookup(lookup_from(&env)).is_err());

        env.pop();
        env.push(("POSTGRES_PORT", "0"));
        assert!(Config::from_lookup(lookup_from(&env)).is_err());
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "POSTGRES_PASSWORD");
        env.push(("POSTGRES_PASSWORD", ""));
        let config = Config::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.database.password, "");
    }

    #[test]
    fn test_zero_max_connections_is_rejected() {
        let mut env = full_env();
        env.push(("DATABASE_MAX_CONNECTIONS", "0"));
        assert!(Config::from_lookup(lookup_from(&env)).is_err());
    }

    #[test]
    fn test_describe_masks_password() {
        let config = Config::from_lookup(lookup_from(&full_env())).unwrap();
        let descriptor = config.database.describe();

        assert_eq!(
            descriptor,
            "host=postgres user=game password=*** dbname=players port=5433 sslmode=disable"
        );
        assert!(!descriptor.contains("secret"));
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Application Configuration - loaded once from the environment at startup
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; required.
    pub database_url: String,
    /// Address the webhook server binds to.
    pub bind_addr: String,
    /// Deadline for a single storage operation.
    pub storage_timeout: Duration,
    /// Connection pool size.
    pub max_connections: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set in the environment")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    /// Reads configuration from the environment. A missing `DATABASE_URL`
    /// or an unparseable value is a fatal startup error, never a runtime
    /// fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let storage_timeout =
            Duration::from_millis(parse_var("STORAGE_TIMEOUT_MS", 5_000u64)?);
        let max_connections = parse_var("DB_MAX_CONNECTIONS", 5u32)?;

        Ok(Self {
            database_url,
            bind_addr,
            storage_timeout,
            max_connections,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Environment mutation is process-global; serialize these tests.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_missing_database_url_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("DATABASE_URL");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_defaults_apply_when_optional_vars_are_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("DATABASE_URL", "postgres://localhost/orders");
        env::remove_var("BIND_ADDR");
        env::remove_var("STORAGE_TIMEOUT_MS");
        env::remove_var("DB_MAX_CONNECTIONS");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.storage_timeout, Duration::from_millis(5_000));
        assert_eq!(config.max_connections, 5);

        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("DATABASE_URL", "postgres://localhost/orders");
        env::set_var("STORAGE_TIMEOUT_MS", "soon");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "STORAGE_TIMEOUT_MS",
                ..
            }
        ));

        env::remove_var("STORAGE_TIMEOUT_MS");
        env::remove_var("DATABASE_URL");
    }
}

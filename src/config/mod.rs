use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::filter::MAX_PAGE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Listing behaviour shared by every `/full` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// Reject unknown filter/sort fields with 400 instead of ignoring them.
    pub strict_fields: bool,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: MAX_PAGE_SIZE,
            strict_fields: true,
            debug_logging: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PORTFOLIO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_DEFAULT_PAGE_SIZE") {
            self.filter.default_page_size = v.parse().unwrap_or(self.filter.default_page_size);
        }
        if let Ok(v) = env::var("FILTER_MAX_PAGE_SIZE") {
            self.filter.max_page_size = v.parse().unwrap_or(self.filter.max_page_size);
        }
        if let Ok(v) = env::var("FILTER_STRICT_FIELDS") {
            self.filter.strict_fields = v.parse().unwrap_or(self.filter.strict_fields);
        }
        if let Ok(v) = env::var("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = v.parse().unwrap_or(self.filter.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }

        self.filter.max_page_size = self.filter.max_page_size.clamp(1, MAX_PAGE_SIZE);
        self.filter.default_page_size = self.filter.default_page_size.clamp(1, self.filter.max_page_size);
        self
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            Environment::Development => "portfolio_api=debug,tower_http=info",
            Environment::Staging => "portfolio_api=info,tower_http=info",
            Environment::Production => "info",
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            filter: FilterConfig {
                debug_logging: true,
                ..FilterConfig::default()
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            filter: FilterConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            filter: FilterConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.filter.strict_fields);
        assert!(config.filter.debug_logging);
        assert_eq!(config.filter.default_page_size, 10);
        assert_eq!(config.filter.max_page_size, 100);
        assert!(config.database.run_migrations);
        assert_eq!(config.default_log_filter(), "portfolio_api=debug,tower_http=info");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.filter.debug_logging);
        assert!(!config.database.run_migrations);
        assert_eq!(config.uploads.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_page_size_overrides_are_clamped() {
        let mut config = AppConfig::development();
        config.filter.max_page_size = 500;
        config.filter.default_page_size = 0;
        let config = config.with_env_overrides();
        assert_eq!(config.filter.max_page_size, 100);
        assert_eq!(config.filter.default_page_size, 1);
    }
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub enable_request_logging: bool,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enable_query_cache: bool,
    pub stale_time_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Well-known storage key the session token lives under
    pub storage_key: String,
    pub validate_token_expiry: bool,
}

impl CacheConfig {
    /// Freshness window for cached reads; zero when caching is disabled
    pub fn stale_time(&self) -> Duration {
        if self.enable_query_cache {
            Duration::from_secs(self.stale_time_secs)
        } else {
            Duration::ZERO
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("GYMDESK_ENV").as_deref() {
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
        // API overrides
        if let Ok(v) = env::var("GYMDESK_API_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            match url::Url::parse(trimmed) {
                Ok(_) => self.api.base_url = trimmed.to_string(),
                Err(e) => tracing::warn!("Ignoring GYMDESK_API_URL '{}': {}", v, e),
            }
        }
        if let Ok(v) = env::var("GYMDESK_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("GYMDESK_CONNECT_TIMEOUT_SECS") {
            self.api.connect_timeout_secs = v.parse().ok();
        }

        // Cache overrides
        if let Ok(v) = env::var("GYMDESK_QUERY_CACHE") {
            self.cache.enable_query_cache = v.parse().unwrap_or(self.cache.enable_query_cache);
        }
        if let Ok(v) = env::var("GYMDESK_CACHE_STALE_SECS") {
            self.cache.stale_time_secs = v.parse().unwrap_or(self.cache.stale_time_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("GYMDESK_VALIDATE_TOKEN_EXPIRY") {
            self.session.validate_token_expiry = v.parse().unwrap_or(self.session.validate_token_expiry);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                enable_request_logging: true,
                connect_timeout_secs: None,
            },
            cache: CacheConfig {
                enable_query_cache: true,
                stale_time_secs: 5 * 60,
            },
            session: SessionConfig {
                storage_key: "token".to_string(),
                validate_token_expiry: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.gymdesk.example.com/api/v1".to_string(),
                enable_request_logging: true,
                connect_timeout_secs: Some(10),
            },
            cache: CacheConfig {
                enable_query_cache: true,
                stale_time_secs: 5 * 60,
            },
            session: SessionConfig {
                storage_key: "token".to_string(),
                validate_token_expiry: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://gymdesk.example.com/api/v1".to_string(),
                enable_request_logging: false,
                connect_timeout_secs: Some(10),
            },
            cache: CacheConfig {
                enable_query_cache: true,
                stale_time_secs: 5 * 60,
            },
            session: SessionConfig {
                storage_key: "token".to_string(),
                validate_token_expiry: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.api.base_url.starts_with("http://localhost"));
        assert_eq!(config.cache.stale_time(), Duration::from_secs(300));
        assert_eq!(config.session.storage_key, "token");
    }

    #[test]
    fn test_disabled_cache_has_zero_stale_time() {
        let mut config = AppConfig::production();
        config.cache.enable_query_cache = false;
        assert_eq!(config.cache.stale_time(), Duration::ZERO);
    }
}

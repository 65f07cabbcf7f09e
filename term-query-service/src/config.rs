//! Configuration for the Term Query Service
//!
//! Everything is read from the environment once, at startup.
//!
//! Required outside dev:
//! - SF_QUERY_SERVICE_URL: query service endpoint receiving `{ "soql": ... }`
//!
//! Optional:
//! - PLATFORM_ENV: dev | staging | prod (default dev)
//! - TERM_QUERY_PORT: listen port (default 8080)
//! - SF_QUERY_AUTH_TOKEN: bearer token for the query service
//! - SF_QUERY_TIMEOUT_SECS: query service timeout (default 30)
//! - TERM_SCHEMA_PATH: schema document overriding the embedded term schema
//! - SERVICE_NAME, TERM_QUERY_LOG_LEVEL

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use serde::Deserialize;
use term_query_handlers::clients::{
    QueryExecutorConfig, QUERY_SERVICE_TIMEOUT_ENV, QUERY_SERVICE_TOKEN_ENV,
    QUERY_SERVICE_URL_ENV,
};
use term_query_handlers::SchemaRegistry;
use tracing::info;
use validator::Validate;

/// Platform environment.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformEnv {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl PlatformEnv {
    fn parse(value: &str) -> Self {
        match value {
            "prod" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Platform environment
    #[serde(default)]
    pub platform_env: PlatformEnv,

    /// Query service endpoint
    #[validate(url)]
    pub query_service_url: String,

    /// Query service bearer token
    pub query_service_token: Option<String>,

    /// Query service request timeout in seconds
    #[serde(default = "default_query_timeout")]
    #[validate(range(min = 1, max = 900))]
    pub query_timeout_secs: u64,

    /// Schema document overriding the embedded term schema
    pub schema_path: Option<PathBuf>,

    /// Service name
    #[serde(default = "default_service_name")]
    #[validate(length(min = 1))]
    pub service_name: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}

fn default_query_timeout() -> u64 {
    30
}

fn default_service_name() -> String {
    "term-query-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In prod/staging `SF_QUERY_SERVICE_URL` must be set. In dev it falls back
    /// to a local query service.
    pub fn load() -> Result<Self> {
        let platform_env =
            PlatformEnv::parse(&env::var("PLATFORM_ENV").unwrap_or_else(|_| "dev".to_string()));

        let query_service_url = match env::var(QUERY_SERVICE_URL_ENV) {
            Ok(url) => url,
            Err(_) if platform_env == PlatformEnv::Dev => "http://localhost:8081/query".to_string(),
            Err(_) => {
                return Err(anyhow!(
                    "{QUERY_SERVICE_URL_ENV} environment variable is required in {} mode. ABORTING STARTUP.",
                    platform_env.as_str()
                ))
            }
        };

        let config = Self {
            port: env::var("TERM_QUERY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_port),
            platform_env,
            query_service_url,
            query_service_token: env::var(QUERY_SERVICE_TOKEN_ENV).ok(),
            query_timeout_secs: env::var(QUERY_SERVICE_TIMEOUT_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_query_timeout),
            schema_path: env::var("TERM_SCHEMA_PATH").ok().map(PathBuf::from),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| default_service_name()),
            log_level: env::var("TERM_QUERY_LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
        };

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {e}. ABORTING STARTUP."))?;
        config.validate_for_production()?;

        Ok(config)
    }

    /// Reject settings that only make sense locally.
    pub fn validate_for_production(&self) -> Result<()> {
        if self.platform_env == PlatformEnv::Dev {
            return Ok(());
        }

        if self.query_service_url.contains("localhost") {
            return Err(anyhow!(
                "{QUERY_SERVICE_URL_ENV} cannot be localhost in production. Got: {}",
                self.query_service_url
            ));
        }

        Ok(())
    }

    /// Query client configuration derived from this config.
    pub fn query_executor(&self) -> Result<QueryExecutorConfig> {
        let mut config = QueryExecutorConfig::new(&self.query_service_url)
            .context("Failed to parse query service URL")?;
        config.auth_token = self.query_service_token.clone();
        config.timeout = Duration::from_secs(self.query_timeout_secs);
        Ok(config)
    }

    /// Load the schema named by `schema_path`, or the embedded term schema.
    pub fn load_schema(&self) -> Result<SchemaRegistry> {
        let schema = match self.schema_path {
            Some(ref path) => SchemaRegistry::from_path(path)
                .with_context(|| format!("Failed to load schema from {}", path.display()))?,
            None => SchemaRegistry::term().context("Failed to load embedded term schema")?,
        };
        Ok(schema)
    }

    /// Log the effective configuration.
    pub fn log_startup(&self) {
        info!(
            service_name = %self.service_name,
            platform_env = self.platform_env.as_str(),
            port = self.port,
            query_service_url = %self.query_service_url,
            query_timeout_secs = self.query_timeout_secs,
            schema_path = ?self.schema_path,
            "Configuration loaded"
        );
    }
}

impl Default for Config {
    /// Default configuration for DEVELOPMENT ONLY.
    fn default() -> Self {
        Self {
            port: default_port(),
            platform_env: PlatformEnv::default(),
            query_service_url: "http://localhost:8081/query".to_string(),
            query_service_token: None,
            query_timeout_secs: default_query_timeout(),
            schema_path: None,
            service_name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.platform_env, PlatformEnv::Dev);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_fails_validation() {
        let config = Config {
            query_service_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = Config {
            query_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_localhost_rejected_in_prod() {
        let config = Config {
            platform_env: PlatformEnv::Prod,
            ..Default::default()
        };
        assert!(config.validate_for_production().is_err());

        let config = Config {
            platform_env: PlatformEnv::Prod,
            query_service_url: "https://sf-query.internal.example.com/query".to_string(),
            ..Default::default()
        };
        assert!(config.validate_for_production().is_ok());
    }

    #[test]
    fn test_query_executor_config() {
        let config = Config {
            query_service_token: Some("secret".to_string()),
            query_timeout_secs: 5,
            ..Default::default()
        };

        let executor = config.query_executor().unwrap();
        assert_eq!(executor.endpoint.as_str(), "http://localhost:8081/query");
        assert_eq!(executor.auth_token.as_deref(), Some("secret"));
        assert_eq!(executor.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_platform_env_parse() {
        assert_eq!(PlatformEnv::parse("prod"), PlatformEnv::Prod);
        assert_eq!(PlatformEnv::parse("staging"), PlatformEnv::Staging);
        assert_eq!(PlatformEnv::parse("anything"), PlatformEnv::Dev);
    }

    #[test]
    fn test_load_rejects_zero_timeout_from_env() {
        // Only test in this crate that touches the process environment
        env::set_var("PLATFORM_ENV", "dev");
        env::set_var(QUERY_SERVICE_URL_ENV, "http://127.0.0.1:9/query");
        env::set_var(QUERY_SERVICE_TIMEOUT_ENV, "0");

        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"), "{err}");

        env::set_var(QUERY_SERVICE_TIMEOUT_ENV, "5");
        let config = Config::load().unwrap();
        assert_eq!(
            config.query_executor().unwrap().timeout,
            Duration::from_secs(5)
        );

        env::remove_var(QUERY_SERVICE_TIMEOUT_ENV);
        env::remove_var(QUERY_SERVICE_URL_ENV);
        env::remove_var("PLATFORM_ENV");
    }

    #[test]
    fn test_embedded_schema_used_by_default() {
        let schema = Config::default().load_schema().unwrap();
        assert!(schema.get("status").is_some());
    }
}

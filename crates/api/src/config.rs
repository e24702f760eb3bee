use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the secrets, whose absence is a fatal configuration error at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Replicate provider configuration.
    pub replicate: ReplicateConfig,
    /// Stale-prediction reaper configuration.
    pub reaper: ReaperConfig,
    /// Re-hosting of generated assets, disabled when `None`.
    pub assets: Option<AssetConfig>,
}

/// Configuration for the Replicate provider integration.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    /// API token for enqueueing predictions.
    pub api_token: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// Publicly reachable URL of our webhook receiver.
    pub webhook_url: String,
    /// API base URL; overridden in tests.
    pub base_url: String,
}

/// Configuration for the stale-prediction reaper.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Age after which a `starting` prediction is force-failed.
    pub timeout: Duration,
    /// How often the reaper scans the store.
    pub interval: Duration,
}

/// Configuration for local asset re-hosting.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Directory generated images are written to.
    pub dir: std::path::PathBuf,
    /// Public base URL under which the directory is served.
    pub public_base_url: String,
}

/// Default stale-prediction timeout in minutes.
const DEFAULT_PREDICTION_TIMEOUT_MINS: u64 = 30;

/// Default reaper scan interval in seconds.
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 300;

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Required | Default                   |
    /// |----------------------------|----------|---------------------------|
    /// | `HOST`                     | no       | `0.0.0.0`                 |
    /// | `PORT`                     | no       | `3000`                    |
    /// | `CORS_ORIGINS`             | no       | `http://localhost:5173`   |
    /// | `REQUEST_TIMEOUT_SECS`     | no       | `30`                      |
    /// | `JWT_SECRET`               | **yes**  | --                        |
    /// | `REPLICATE_API_TOKEN`      | **yes**  | --                        |
    /// | `REPLICATE_WEBHOOK_SECRET` | **yes**  | --                        |
    /// | `REPLICATE_WEBHOOK_URL`    | **yes**  | --                        |
    /// | `REPLICATE_BASE_URL`       | no       | `https://api.replicate.com` |
    /// | `PREDICTION_TIMEOUT_MINS`  | no       | `30`                      |
    /// | `REAPER_INTERVAL_SECS`     | no       | `300`                     |
    /// | `ASSET_DIR`                | no       | unset (re-hosting off)    |
    /// | `ASSET_PUBLIC_BASE_URL`    | with dir | --                        |
    ///
    /// # Panics
    ///
    /// Panics when a required variable is missing or malformed. Configuration
    /// errors are fatal, never retried.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            replicate: ReplicateConfig::from_env(),
            reaper: ReaperConfig::from_env(),
            assets: AssetConfig::from_env(),
        }
    }
}

impl ReplicateConfig {
    /// Load provider configuration.
    ///
    /// # Panics
    ///
    /// Panics when the API token, webhook secret, or webhook URL is absent.
    pub fn from_env() -> Self {
        let api_token = std::env::var("REPLICATE_API_TOKEN")
            .expect("REPLICATE_API_TOKEN must be set in the environment");
        assert!(!api_token.is_empty(), "REPLICATE_API_TOKEN must not be empty");

        let webhook_secret = std::env::var("REPLICATE_WEBHOOK_SECRET")
            .expect("REPLICATE_WEBHOOK_SECRET must be set in the environment");
        assert!(
            !webhook_secret.is_empty(),
            "REPLICATE_WEBHOOK_SECRET must not be empty"
        );

        let webhook_url = std::env::var("REPLICATE_WEBHOOK_URL")
            .expect("REPLICATE_WEBHOOK_URL must be set in the environment");

        let base_url = std::env::var("REPLICATE_BASE_URL")
            .unwrap_or_else(|_| "https://api.replicate.com".into());

        Self {
            api_token,
            webhook_secret,
            webhook_url,
            base_url,
        }
    }
}

impl ReaperConfig {
    /// Load reaper configuration with defaults.
    pub fn from_env() -> Self {
        let timeout_mins: u64 = std::env::var("PREDICTION_TIMEOUT_MINS")
            .unwrap_or_else(|_| DEFAULT_PREDICTION_TIMEOUT_MINS.to_string())
            .parse()
            .expect("PREDICTION_TIMEOUT_MINS must be a valid u64");

        let interval_secs: u64 = std::env::var("REAPER_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_REAPER_INTERVAL_SECS.to_string())
            .parse()
            .expect("REAPER_INTERVAL_SECS must be a valid u64");

        Self {
            timeout: Duration::from_secs(timeout_mins * 60),
            interval: Duration::from_secs(interval_secs),
        }
    }
}

impl AssetConfig {
    /// Load asset re-hosting configuration.
    ///
    /// Re-hosting is opt-in: unset `ASSET_DIR` disables it. When the
    /// directory is set, the public base URL is required.
    pub fn from_env() -> Option<Self> {
        let dir = std::env::var("ASSET_DIR").ok()?;
        let public_base_url = std::env::var("ASSET_PUBLIC_BASE_URL")
            .expect("ASSET_PUBLIC_BASE_URL must be set when ASSET_DIR is configured");
        Some(Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

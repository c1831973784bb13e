//! API configuration.

use chrono::Duration;

/// Fallback signing secret for local development only.
const DEV_JWT_SECRET: &str = "dev-secret";

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 signing secret for issued tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub jwt_ttl: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Postgres connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl: Duration::days(30),
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            database_url: None,
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("persistent", &self.database_url.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| {
                    tracing::warn!("JWT_SECRET not set; using insecure dev default");
                    defaults.jwt_secret
                }),
            jwt_ttl: std::env::var("JWT_TTL_SECS")
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::seconds)
                .unwrap_or(defaults.jwt_ttl),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Refuse to start a production server signing tokens with the dev secret.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && self.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("JWT_SECRET must be set when ENVIRONMENT=production");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

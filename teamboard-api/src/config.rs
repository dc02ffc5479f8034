/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default:
///   http://localhost:3000, `*` allows any origin)
/// - `STORE_BACKEND`: `memory` or `postgres` (default: memory)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_QUERY_TIMEOUT_SECONDS`: Per-query timeout (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 chars)
/// - `CASCADE_MAX_RETRIES`: Retries per cascade step (default: 3)
/// - `CASCADE_BASE_RETRY_DELAY_MS`: First backoff delay (default: 50)
/// - `CASCADE_MAX_RETRY_DELAY_MS`: Backoff ceiling (default: 1000)
/// - `RUST_LOG`: Log filter (default: debug for teamboard crates)
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for text
///
/// # Example
///
/// ```no_run
/// use teamboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use teamboard_shared::workflow::cascade::CascadeConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Persistence configuration
    pub store: StoreConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Cascade delete retry configuration
    pub cascade: CascadeRetryConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

/// Which persistence adapter to run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => anyhow::bail!("STORE_BACKEND must be 'memory' or 'postgres', got '{}'", other),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL (postgres backend only)
    pub database_url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Upper bound on a single store call
    pub query_timeout_seconds: u64,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Cascade delete retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeRetryConfig {
    pub max_retries: u32,
    pub base_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

impl From<&CascadeRetryConfig> for CascadeConfig {
    fn from(config: &CascadeRetryConfig) -> Self {
        CascadeConfig {
            max_retries: config.max_retries,
            base_retry_delay_ms: config.base_retry_delay_ms,
            max_retry_delay_ms: config.max_retry_delay_ms,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = parse_var::<u16>("API_PORT", &var_or("API_PORT", "8080"))?;

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let backend = var_or("STORE_BACKEND", "memory").parse::<StoreBackend>()?;
        let database_url = lookup("DATABASE_URL");
        if backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required for the postgres backend");
        }

        let max_connections =
            parse_var::<u32>("DATABASE_MAX_CONNECTIONS", &var_or("DATABASE_MAX_CONNECTIONS", "10"))?;
        let query_timeout_seconds = parse_var::<u64>(
            "DATABASE_QUERY_TIMEOUT_SECONDS",
            &var_or("DATABASE_QUERY_TIMEOUT_SECONDS", "10"),
        )?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cascade = CascadeRetryConfig {
            max_retries: parse_var("CASCADE_MAX_RETRIES", &var_or("CASCADE_MAX_RETRIES", "3"))?,
            base_retry_delay_ms: parse_var(
                "CASCADE_BASE_RETRY_DELAY_MS",
                &var_or("CASCADE_BASE_RETRY_DELAY_MS", "50"),
            )?,
            max_retry_delay_ms: parse_var(
                "CASCADE_MAX_RETRY_DELAY_MS",
                &var_or("CASCADE_MAX_RETRY_DELAY_MS", "1000"),
            )?,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            store: StoreConfig {
                backend,
                database_url,
                max_connections,
                query_timeout_seconds,
            },
            jwt: JwtConfig { secret: jwt_secret },
            cascade,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, value, e))
}

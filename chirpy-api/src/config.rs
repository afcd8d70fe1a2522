/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. A `.env` file is read first if present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `PLATFORM`: `dev` unlocks the reset endpoint; anything else is production
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `FILESERVER_ROOT`: Directory served under `/app/` (default: .)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for access token signing (required, >= 32 chars)
/// - `ACCESS_TOKEN_TTL_SECONDS`: Access token lifetime (default: 3600, at most
///   the refresh token lifetime)
/// - `POLKA_KEY`: Payment provider webhook key (optional)
/// - `PASSWORD_HASH_MEMORY_KIB`, `PASSWORD_HASH_ITERATIONS`,
///   `PASSWORD_HASH_PARALLELISM`: Argon2id cost
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use chirpy_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use chirpy_shared::auth::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;
use chirpy_shared::auth::password::HashParams;
use chirpy_shared::auth::refresh_token::REFRESH_TOKEN_TTL_DAYS;
use chirpy_shared::platform::Platform;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted access token lifetime
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = REFRESH_TOKEN_TTL_DAYS * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Storage configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Deployment mode
    pub platform: Platform,

    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,

    /// Directory served under `/app/`
    pub fileserver_root: PathBuf,
}

/// Which [`chirpy_shared::store::Store`] to run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via `DATABASE_URL`
    Postgres,

    /// Process-local, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND: {}", other),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend
    pub backend: StorageBackend,

    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -base64 64`
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,

    /// Key the payment provider presents as `ApiKey`
    pub polka_key: Option<String>,

    /// Argon2id cost parameters
    pub password_hashing: HashParams,
}

impl AuthConfig {
    /// Access token lifetime
    ///
    /// Clamped to `1..=MAX_ACCESS_TOKEN_TTL_SECONDS` for configs built by hand.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl_seconds.clamp(1, MAX_ACCESS_TOKEN_TTL_SECONDS))
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
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let backend = var("STORAGE_BACKEND", "postgres").parse::<StorageBackend>()?;
        let database_url = lookup("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        let access_token_ttl_seconds = var(
            "ACCESS_TOKEN_TTL_SECONDS",
            &DEFAULT_ACCESS_TOKEN_TTL_SECONDS.to_string(),
        )
        .parse::<i64>()
        .context("ACCESS_TOKEN_TTL_SECONDS must be an integer")?;

        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            anyhow::bail!(
                "ACCESS_TOKEN_TTL_SECONDS must be between 1 and {}",
                MAX_ACCESS_TOKEN_TTL_SECONDS
            );
        }

        let defaults = HashParams::default();
        let password_hashing = HashParams {
            memory_kib: var("PASSWORD_HASH_MEMORY_KIB", &defaults.memory_kib.to_string())
                .parse()
                .context("PASSWORD_HASH_MEMORY_KIB must be an integer")?,
            iterations: var("PASSWORD_HASH_ITERATIONS", &defaults.iterations.to_string())
                .parse()
                .context("PASSWORD_HASH_ITERATIONS must be an integer")?,
            parallelism: var("PASSWORD_HASH_PARALLELISM", &defaults.parallelism.to_string())
                .parse()
                .context("PASSWORD_HASH_PARALLELISM must be an integer")?,
        };
        password_hashing
            .validate()
            .context("PASSWORD_HASH_* values are not valid Argon2 parameters")?;

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: api_port,
                platform: Platform::parse(&var("PLATFORM", "")),
                cors_origins,
                fileserver_root: PathBuf::from(var("FILESERVER_ROOT", ".")),
            },
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl_seconds,
                polka_key: lookup("POLKA_KEY").filter(|key| !key.is_empty()),
                password_hashing,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

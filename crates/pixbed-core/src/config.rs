//! Configuration module
//!
//! Configuration is read from the environment once at startup. Upload
//! validation profiles are materialized here and passed by value into the
//! ingestion pipeline; nothing reads limits from ambient global state after
//! boot.

use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_QUALITY;
use crate::models::UploadProfile;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_GUEST_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
const DEFAULT_STATS_CACHE_TTL_SECS: u64 = 60;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    /// Root directory of the month-sharded upload tree.
    pub upload_root: PathBuf,
    /// Whether the unauthenticated upload route is enabled.
    pub guest_uploads_enabled: bool,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub guest_max_file_size_bytes: usize,
    pub guest_allowed_content_types: Vec<String>,
    /// Re-encode quality used when the client does not pass one.
    pub default_quality: u8,
    pub stats_cache_ttl_seconds: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list_or(key: &str, default: &str) -> Vec<String> {
    env_or(key, default)
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from the environment (a `.env` file is honored if
    /// present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Config {
            server_port: env_parse_or("PORT", DEFAULT_PORT),
            database_url,
            db_max_connections: env_parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse_or("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS),
            environment: env_or("ENVIRONMENT", "development"),
            upload_root: PathBuf::from(env_or("UPLOAD_ROOT", "./uploads")),
            guest_uploads_enabled: env_or("ENABLE_GUEST_UPLOAD", "false") == "true",
            max_file_size_bytes: env_parse_or("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            allowed_content_types: env_list_or(
                "ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/jpg,image/png,image/gif,image/webp,image/svg+xml",
            ),
            guest_max_file_size_bytes: env_parse_or(
                "GUEST_MAX_FILE_SIZE",
                DEFAULT_GUEST_MAX_FILE_SIZE,
            ),
            guest_allowed_content_types: env_list_or(
                "GUEST_ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/jpg,image/png,image/webp",
            ),
            default_quality: env_parse_or("IMAGE_QUALITY", DEFAULT_QUALITY).clamp(1, 100),
            stats_cache_ttl_seconds: env_parse_or(
                "STATS_CACHE_TTL_SECONDS",
                DEFAULT_STATS_CACHE_TTL_SECS,
            ),
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_ascii_lowercase();
        env == "production" || env == "prod"
    }

    /// Profile applied to authenticated uploads.
    pub fn authenticated_profile(&self) -> UploadProfile {
        UploadProfile::new(
            "authenticated",
            self.allowed_content_types.clone(),
            self.max_file_size_bytes,
        )
    }

    /// Profile applied to guest uploads; stricter types and a lower ceiling.
    pub fn guest_profile(&self) -> UploadProfile {
        UploadProfile::new(
            "guest",
            self.guest_allowed_content_types.clone(),
            self.guest_max_file_size_bytes,
        )
    }
}

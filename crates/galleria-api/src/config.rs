//! Server configuration from environment variables.

use std::time::Duration;

use axum::http::HeaderValue;
use tracing::warn;

use galleria_core::defaults;

/// Server settings. Vision settings live in `galleria_inference::VisionConfig`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub file_storage_path: String,
    /// Request body limit, applied to multipart uploads too.
    pub max_upload_bytes: usize,
    /// Upper bound for computing one perceptual hash.
    pub hash_timeout: Duration,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/galleria".to_string(),
            host: "0.0.0.0".to_string(),
            port: defaults::SERVER_PORT,
            file_storage_path: defaults::FILE_STORAGE_PATH.to_string(),
            max_upload_bytes: defaults::MAX_BODY_SIZE_BYTES,
            hash_timeout: Duration::from_millis(defaults::HASH_TIMEOUT_MS),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_or_warn::<u16>("PORT", get("PORT")) {
            config.port = port;
        }
        if let Some(path) = get("FILE_STORAGE_PATH") {
            config.file_storage_path = path;
        }
        if let Some(bytes) = parse_or_warn::<usize>("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES")) {
            config.max_upload_bytes = bytes;
        }
        if let Some(ms) = parse_or_warn::<u64>("HASH_TIMEOUT_MS", get("HASH_TIMEOUT_MS")) {
            config.hash_timeout = Duration::from_millis(ms);
        }
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = parse_allowed_origins(&origins);
        }
        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(subsystem = "api", component = "config", key, value = %value, "Ignoring invalid value, using default");
            None
        }
    }
}

/// Parse a comma-separated origin list, skipping blanks and invalid entries.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

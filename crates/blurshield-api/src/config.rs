//! API configuration, loaded from the environment at startup.

/// Server and behavior configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated explicit origins; no wildcard support.
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    /// When set, `X-API-Key` must match exactly. Unset means the
    /// endpoint is reachable by anyone unless `dev_mode` overrides it.
    pub api_key: Option<String>,
    /// Bypasses the `X-API-Key` check entirely. Logged once at startup.
    pub dev_mode: bool,
    /// `max(2, logical_cpu_count)` unless overridden.
    pub detector_pool_size: usize,
    /// Clamped to `[1, 100]`.
    pub max_upload_size_mb: u64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let max_upload_size_mb = std::env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(100)
            .clamp(1, 100);

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            api_key: std::env::var("API_KEY").ok().filter(|s| !s.is_empty()),
            dev_mode: std::env::var("DEV_MODE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            detector_pool_size: blurshield_media::default_pool_size(),
            max_upload_size_mb,
        }
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Whether the `X-API-Key` check is actually enforced.
    pub fn auth_enabled(&self) -> bool {
        !self.dev_mode && self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_upload_size_bytes_multiplies_mb() {
        let mut config = ApiConfig::from_env();
        config.max_upload_size_mb = 10;
        assert_eq!(config.max_upload_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn auth_disabled_in_dev_mode_even_with_key() {
        let mut config = ApiConfig::from_env();
        config.api_key = Some("secret".to_string());
        config.dev_mode = true;
        assert!(!config.auth_enabled());
    }

    #[test]
    fn auth_disabled_without_a_configured_key() {
        let mut config = ApiConfig::from_env();
        config.api_key = None;
        config.dev_mode = false;
        assert!(!config.auth_enabled());
    }
}

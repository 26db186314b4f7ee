//! API configuration.
//!
//! Loaded from environment variables with development-friendly
//! defaults. Database settings live in [`crate::db::DbConfig`].

/// HTTP-layer configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in the env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Bind host for the HTTP listener.
    pub bind_host: String,

    /// Bind port for the HTTP listener.
    pub bind_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
        }
    }
}

impl ApiConfig {
    /// Create an ApiConfig from environment variables.
    ///
    /// - `PULSEBOARD_CORS_ORIGINS`: comma-separated origins (empty = allow all)
    /// - `PULSEBOARD_BIND`: listener host (default: 0.0.0.0)
    /// - `PORT` / `PULSEBOARD_PORT`: listener port (default: 3000)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("PULSEBOARD_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let bind_host =
            std::env::var("PULSEBOARD_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());

        let bind_port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("PULSEBOARD_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Self {
            cors_origins,
            bind_host,
            bind_port,
        }
    }

    /// Whether CORS is restricted to an explicit origin list.
    pub fn cors_restricted(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_permissive() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_restricted());
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.bind_port, 3000);
    }

    #[test]
    fn explicit_origins_restrict_cors() {
        let config = ApiConfig {
            cors_origins: vec!["https://dash.example.com".to_string()],
            ..ApiConfig::default()
        };
        assert!(config.cors_restricted());
    }
}

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_GATEWAY_URL: &str = "https://api.pix-gateway.example/api/v1";
pub const DEFAULT_TRACKING_ENDPOINT: &str = "https://api.tracking.example/api-credentials/orders";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    /// Shared token the gateway echoes in every webhook. `None` disables verification.
    pub webhook_token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            public_key: None,
            secret_key: None,
            webhook_token: None,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub platform: String,
    pub timeout_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TRACKING_ENDPOINT.to_string(),
            api_token: None,
            platform: "PixCheckout".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_port: u16,
    /// Public URL of this service, used to build the gateway callback URL.
    pub public_base_url: Option<String>,
    pub gateway: GatewayConfig,
    pub tracking: TrackingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            public_base_url: None,
            gateway: GatewayConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| defaults.server_port.to_string())
                .parse()
                .unwrap_or(defaults.server_port),
            public_base_url: optional_var("PUBLIC_BASE_URL"),
            gateway: GatewayConfig {
                base_url: env::var("GATEWAY_BASE_URL")
                    .unwrap_or_else(|_| defaults.gateway.base_url.clone()),
                public_key: optional_var("GATEWAY_PUBLIC_KEY"),
                secret_key: optional_var("GATEWAY_SECRET_KEY"),
                webhook_token: optional_var("GATEWAY_WEBHOOK_TOKEN"),
                timeout_ms: env::var("GATEWAY_TIMEOUT_MS")
                    .unwrap_or_else(|_| defaults.gateway.timeout_ms.to_string())
                    .parse()
                    .unwrap_or(defaults.gateway.timeout_ms),
            },
            tracking: TrackingConfig {
                endpoint: env::var("TRACKING_ENDPOINT")
                    .unwrap_or_else(|_| defaults.tracking.endpoint.clone()),
                api_token: optional_var("TRACKING_API_TOKEN"),
                platform: env::var("TRACKING_PLATFORM")
                    .unwrap_or_else(|_| defaults.tracking.platform.clone()),
                timeout_ms: env::var("TRACKING_TIMEOUT_MS")
                    .unwrap_or_else(|_| defaults.tracking.timeout_ms.to_string())
                    .parse()
                    .unwrap_or(defaults.tracking.timeout_ms),
            },
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.gateway.base_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.tracking.platform, "PixCheckout");
        assert!(config.gateway.webhook_token.is_none());
        assert!(config.tracking.api_token.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server_port = 8080
public_base_url = "https://loja.example.com"

[gateway]
public_key = "pk_live"
secret_key = "sk_live"
webhook_token = "whk"

[tracking]
api_token = "trk"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.public_base_url.as_deref(), Some("https://loja.example.com"));
        assert_eq!(config.gateway.public_key.as_deref(), Some("pk_live"));
        assert_eq!(config.gateway.webhook_token.as_deref(), Some("whk"));
        assert_eq!(config.gateway.timeout_ms, 10_000);
        assert_eq!(config.tracking.api_token.as_deref(), Some("trk"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/pix-checkout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = Config::from_toml_str("server_port = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

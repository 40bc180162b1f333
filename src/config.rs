//! Configuration for kova-preview
//!
//! All configuration is environment-derived and loaded exactly once at
//! startup. Missing API keys abort startup before the listener binds, so a
//! misconfigured process never accepts a submission it cannot service.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};

/// Default bind address for the service
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";

/// Default city applied to submissions that omit one
pub const DEFAULT_CITY: &str = "Phoenix";

/// Default state applied to submissions that omit one
pub const DEFAULT_STATE: &str = "AZ";

/// Process-wide configuration, resolved from `KOVA_*` environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address (KOVA_BIND_ADDR)
    pub bind_addr: SocketAddr,
    /// SQLite database file path (KOVA_DATABASE_PATH)
    pub database_path: PathBuf,
    /// Root directory for stored blobs (KOVA_STORAGE_ROOT)
    pub storage_root: PathBuf,
    /// Externally reachable base URL, used to build public blob URLs
    /// (KOVA_PUBLIC_BASE_URL)
    pub public_base_url: String,
    /// API key for the research service (KOVA_RESEARCH_API_KEY, required)
    pub research_api_key: String,
    /// API key for the generative gateway (KOVA_GATEWAY_API_KEY, required)
    pub gateway_api_key: String,
    /// Base URL of the research service (KOVA_RESEARCH_BASE_URL)
    pub research_base_url: String,
    /// Base URL of the generative gateway (KOVA_GATEWAY_BASE_URL)
    pub gateway_base_url: String,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Fails fast if a required key is absent or blank.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("KOVA_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("KOVA_BIND_ADDR is not a valid address: {}", e)))?;

        let database_path = PathBuf::from(env_or("KOVA_DATABASE_PATH", "kova.db"));
        let storage_root = PathBuf::from(env_or("KOVA_STORAGE_ROOT", "storage"));
        let public_base_url =
            trim_trailing_slash(env_or("KOVA_PUBLIC_BASE_URL", &format!("http://{}", bind_addr)));

        let research_api_key = required_key("KOVA_RESEARCH_API_KEY")?;
        let gateway_api_key = required_key("KOVA_GATEWAY_API_KEY")?;

        let research_base_url =
            trim_trailing_slash(env_or("KOVA_RESEARCH_BASE_URL", "https://api.perplexity.ai"));
        let gateway_base_url = trim_trailing_slash(env_or(
            "KOVA_GATEWAY_BASE_URL",
            "https://ai.gateway.lovable.dev/v1",
        ));

        info!(
            bind_addr = %bind_addr,
            database = %database_path.display(),
            storage = %storage_root.display(),
            "Configuration loaded from environment"
        );

        Ok(Self {
            bind_addr,
            database_path,
            storage_root,
            public_base_url,
            research_api_key,
            gateway_api_key,
            research_base_url,
            gateway_base_url,
        })
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

fn required_key(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if is_valid_key(&v) => Ok(v),
        _ => Err(Error::Config(format!(
            "{} not configured. Set the environment variable before starting the service.",
            name
        ))),
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "KOVA_BIND_ADDR",
            "KOVA_DATABASE_PATH",
            "KOVA_STORAGE_ROOT",
            "KOVA_PUBLIC_BASE_URL",
            "KOVA_RESEARCH_API_KEY",
            "KOVA_GATEWAY_API_KEY",
            "KOVA_RESEARCH_BASE_URL",
            "KOVA_GATEWAY_BASE_URL",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn missing_api_keys_fail_fast() {
        clear_env();
        assert!(Config::from_env().is_err());

        std::env::set_var("KOVA_RESEARCH_API_KEY", "research-key");
        // Gateway key still missing
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn blank_key_is_rejected() {
        clear_env();
        std::env::set_var("KOVA_RESEARCH_API_KEY", "   ");
        std::env::set_var("KOVA_GATEWAY_API_KEY", "gateway-key");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn full_env_loads_with_defaults() {
        clear_env();
        std::env::set_var("KOVA_RESEARCH_API_KEY", "research-key");
        std::env::set_var("KOVA_GATEWAY_API_KEY", "gateway-key");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.research_base_url, "https://api.perplexity.ai");
        assert_eq!(config.gateway_base_url, "https://ai.gateway.lovable.dev/v1");
        assert_eq!(config.public_base_url, format!("http://{}", DEFAULT_BIND_ADDR));
        clear_env();
    }

    #[test]
    #[serial]
    fn base_urls_lose_trailing_slashes() {
        clear_env();
        std::env::set_var("KOVA_RESEARCH_API_KEY", "research-key");
        std::env::set_var("KOVA_GATEWAY_API_KEY", "gateway-key");
        std::env::set_var("KOVA_GATEWAY_BASE_URL", "http://localhost:9999/v1/");

        let config = Config::from_env().expect("config should load");
        assert_eq!(config.gateway_base_url, "http://localhost:9999/v1");
        clear_env();
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}

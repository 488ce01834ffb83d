//! Client configuration.
//!
//! Values are layered: explicit overrides first, then `FRESHPLATE_*`
//! environment variables, then the JSON config file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{normalize_base_url, normalize_text_option};

pub const API_URL_ENV: &str = "FRESHPLATE_API_URL";
pub const HTTP_TIMEOUT_ENV: &str = "FRESHPLATE_HTTP_TIMEOUT_SECS";
pub const TOKEN_ENV: &str = "FRESHPLATE_TOKEN";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

const fn default_config_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_SCHEMA_VERSION,
            api_base_url: None,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Values found in the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            version: CONFIG_SCHEMA_VERSION,
            api_base_url: normalize_text_option(lookup(API_URL_ENV)),
            request_timeout_secs: normalize_text_option(lookup(HTTP_TIMEOUT_ENV))
                .and_then(|raw| match raw.parse::<u64>() {
                    Ok(secs) => Some(secs),
                    Err(error) => {
                        tracing::warn!("Ignoring invalid {}={}: {}", HTTP_TIMEOUT_ENV, raw, error);
                        None
                    }
                }),
        }
    }

    /// Fill unset values from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            version: self.version,
            api_base_url: normalize_text_option(self.api_base_url)
                .or_else(|| normalize_text_option(fallback.api_base_url)),
            request_timeout_secs: self.request_timeout_secs.or(fallback.request_timeout_secs),
        }
    }

    /// Normalized API base URL. Errors when unset or not http(s).
    pub fn api_base_url(&self) -> Result<String> {
        let raw = normalize_text_option(self.api_base_url.clone()).ok_or_else(|| {
            Error::Config(format!(
                "API base URL is not configured. Set {API_URL_ENV} or run `freshplate config set-api-url <url>`."
            ))
        })?;
        normalize_base_url(&raw).map_err(Error::Config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        parse_client_config(&raw)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut normalized = self.clone();
        normalized.version = CONFIG_SCHEMA_VERSION;
        normalized.api_base_url = normalize_text_option(normalized.api_base_url);
        std::fs::write(path, serde_json::to_string_pretty(&normalized)?)?;
        Ok(())
    }
}

/// Parse a config file payload, rejecting unknown fields and schema versions.
pub fn parse_client_config(payload: &str) -> Result<ClientConfig> {
    let mut config: ClientConfig = serde_json::from_str(payload)?;
    if config.version != CONFIG_SCHEMA_VERSION {
        return Err(Error::Config(format!(
            "unsupported config version {} (expected {})",
            config.version, CONFIG_SCHEMA_VERSION
        )));
    }
    config.api_base_url = normalize_text_option(config.api_base_url);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_lookup_reads_environment_values() {
        let env = HashMap::from([
            (API_URL_ENV, " https://api.example.com/ "),
            (HTTP_TIMEOUT_ENV, "3"),
        ]);
        let config = ClientConfig::from_lookup(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.api_base_url().unwrap(), "https://api.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let config = ClientConfig::from_lookup(|key| {
            (key == HTTP_TIMEOUT_ENV).then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        );
    }

    #[test]
    fn or_prefers_explicit_values() {
        let explicit = ClientConfig {
            api_base_url: Some("https://override.example.com".to_string()),
            ..ClientConfig::default()
        };
        let file = ClientConfig {
            api_base_url: Some("https://file.example.com".to_string()),
            request_timeout_secs: Some(30),
            ..ClientConfig::default()
        };
        let merged = explicit.or(file);
        assert_eq!(
            merged.api_base_url.as_deref(),
            Some("https://override.example.com")
        );
        assert_eq!(merged.request_timeout_secs, Some(30));
    }

    #[test]
    fn missing_api_url_is_a_config_error() {
        let error = ClientConfig::default().api_base_url().unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let error = parse_client_config(r#"{"version":1,"api_url":"x"}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn parse_rejects_other_versions() {
        let error = parse_client_config(r#"{"version":7}"#).unwrap_err();
        assert!(error.to_string().contains("version"));
    }

    #[test]
    fn config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cli-config.json");
        let config = ClientConfig {
            version: 1,
            api_base_url: Some(" https://api.example.com ".to_string()),
            request_timeout_secs: Some(4),
        };
        config.save_to_path(&path).unwrap();

        let loaded = ClientConfig::load_from_path(&path).unwrap();
        assert_eq!(
            loaded.api_base_url.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(loaded.request_timeout_secs, Some(4));
    }

    #[test]
    fn load_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ClientConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }
}

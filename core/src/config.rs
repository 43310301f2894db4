use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::PLUGIN_IDENTIFIER;
use crate::tab::DEFAULT_CONTENT_URL;
use crate::targets;
use crate::{Error, StorageAction};

pub const CONFIG_ENV_VAR: &str = "MMFLINK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mmflink.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub plugin_identifier: String,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub content_url: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            plugin_identifier: PLUGIN_IDENTIFIER.to_string(),
            api_key: None,
            request_timeout_ms: 10_000,
            content_url: DEFAULT_CONTENT_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    /// `<server>/sockjs/websocket`, with the scheme switched to ws/wss.
    pub fn push_socket_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{base}/sockjs/websocket")
    }

    pub fn config_path() -> String {
        std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let label = path.display().to_string();
        if !path.exists() {
            info!(target: targets::SETTINGS, path = %label, "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| Error::StorageIo {
            action: StorageAction::Load,
            path: Some(label.clone()),
            source,
        })?;
        let config = Self::from_ron(&text).map_err(|error| match error {
            Error::Ron { action, source, .. } => Error::Ron {
                action,
                path: Some(label.clone()),
                source,
            },
            other => other,
        })?;
        debug!(target: targets::SETTINGS, path = %label, server = %config.server_url, "Config loaded");
        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self, Error> {
        ron::from_str(text).map_err(|error| Error::Ron {
            action: StorageAction::Load,
            path: None,
            source: error.code,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(
            |source| Error::Ron {
                action: StorageAction::Save,
                path: Some(label.clone()),
                source,
            },
        )?;
        fs::write(path, text).map_err(|source| Error::StorageIo {
            action: StorageAction::Save,
            path: Some(label),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = AppConfig::from_ron(r#"(server_url: "http://octopi.local", api_key: Some("abc"))"#)
            .expect("parse config");
        assert_eq!(config.server_url, "http://octopi.local");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.plugin_identifier, PLUGIN_IDENTIFIER);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn invalid_ron_reports_load_error() {
        let error = AppConfig::from_ron("(server_url: 5").expect_err("invalid config");
        assert!(matches!(
            error,
            Error::Ron {
                action: StorageAction::Load,
                ..
            }
        ));
    }

    #[test]
    fn push_socket_url_follows_scheme() {
        let mut config = AppConfig::default();
        assert_eq!(config.push_socket_url(), "ws://127.0.0.1:5000/sockjs/websocket");

        config.server_url = "https://octopi.local/".to_string();
        assert_eq!(config.push_socket_url(), "wss://octopi.local/sockjs/websocket");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load("definitely/not/here/mmflink.ron").expect("defaults");
        assert_eq!(config, AppConfig::default());
    }
}

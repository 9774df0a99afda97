// src/config.rs

//! Scanner configuration. Built once by the binary and handed to the core
//! explicitly; nothing in `core` reads the process environment.

use crate::core::error::ScanError;
use crate::core::models::CheckId;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.json";
pub const VIRUSTOTAL_KEY_ENV: &str = "VIRUSTOTAL_API_KEY";
pub const SAFE_BROWSING_KEY_ENV: &str = "GOOGLE_SAFEBROWSING_API_KEY";

pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "webguard", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

/// Base URLs of the external services. Overridable so tests can point the
/// clients at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub ssl_labs: String,
    pub security_headers: String,
    pub observatory: String,
    pub virus_total: String,
    pub safe_browsing: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ssl_labs: "https://api.ssllabs.com".to_string(),
            security_headers: "https://securityheaders.com".to_string(),
            observatory: "https://http-observatory.security.mozilla.org".to_string(),
            virus_total: "https://www.virustotal.com".to_string(),
            safe_browsing: "https://safebrowsing.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    pub virustotal_api_key: Option<String>,
    pub safe_browsing_api_key: Option<String>,
    /// Timeout applied by the HTTP client to every request.
    pub request_timeout_secs: u64,
    /// Optional upper bound on a whole provider call, polling included.
    pub provider_timeout_secs: Option<u64>,
    pub observatory_poll_attempts: u32,
    pub observatory_poll_interval_ms: u64,
    pub user_agent: String,
    pub endpoints: EndpointConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            virustotal_api_key: None,
            safe_browsing_api_key: None,
            request_timeout_secs: 30,
            provider_timeout_secs: None,
            observatory_poll_attempts: 10,
            observatory_poll_interval_ms: 2000,
            user_agent: format!("WebGuard/{}", env!("CARGO_PKG_VERSION")),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ScannerConfig {
    /// Reads `config.json` from the platform config dir (if present) and
    /// overlays API keys from the environment.
    pub fn load() -> Result<Self, ScanError> {
        let mut config = Self::from_file(&get_config_dir().join(CONFIG_FILE))?;
        config.apply_env(|name| std::env::var(name).ok());
        info!(
            virustotal = config.credential(CheckId::VirusTotal).is_some(),
            safe_browsing = config.credential(CheckId::SafeBrowsing).is_some(),
            "Configuration loaded."
        );
        Ok(config)
    }

    /// Defaults when `path` does not exist; an unreadable or malformed file is
    /// an `InvalidConfiguration` error.
    pub fn from_file(path: &Path) -> Result<Self, ScanError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults.");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScanError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ScanError::InvalidConfiguration(format!("{}: {}", path.display(), e)))
    }

    /// Overlays credentials found through `lookup`, which is
    /// `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(VIRUSTOTAL_KEY_ENV) {
            self.virustotal_api_key = Some(key);
        }
        if let Some(key) = lookup(SAFE_BROWSING_KEY_ENV) {
            self.safe_browsing_api_key = Some(key);
        }
    }

    /// The configured credential for `check`. Blank keys count as absent;
    /// checks that need no credential always return `None`.
    pub fn credential(&self, check: CheckId) -> Option<&str> {
        let key = match check {
            CheckId::VirusTotal => self.virustotal_api_key.as_deref(),
            CheckId::SafeBrowsing => self.safe_browsing_api_key.as_deref(),
            _ => None,
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_secs.map(Duration::from_secs)
    }

    pub fn observatory_poll_interval(&self) -> Duration {
        Duration::from_millis(self.observatory_poll_interval_ms)
    }

    pub fn with_virustotal_key(mut self, key: &str) -> Self {
        self.virustotal_api_key = Some(key.to_string());
        self
    }

    pub fn with_safe_browsing_key(mut self, key: &str) -> Self {
        self.safe_browsing_api_key = Some(key.to_string());
        self
    }

    /// Points every service at `base`, as a mock server does in tests.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.endpoints = EndpointConfig {
            ssl_labs: base.to_string(),
            security_headers: base.to_string(),
            observatory: base.to_string(),
            virus_total: base.to_string(),
            safe_browsing: base.to_string(),
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_no_credentials() {
        let config = ScannerConfig::default();
        assert!(config.credential(CheckId::VirusTotal).is_none());
        assert!(config.credential(CheckId::SafeBrowsing).is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.provider_timeout().is_none());
    }

    #[test]
    fn blank_keys_count_as_absent() {
        let config = ScannerConfig::default().with_virustotal_key("   ").with_safe_browsing_key("sb-key");
        assert!(config.credential(CheckId::VirusTotal).is_none());
        assert_eq!(config.credential(CheckId::SafeBrowsing), Some("sb-key"));
        assert!(config.credential(CheckId::Ssl).is_none());
    }

    #[test]
    fn env_lookup_overlays_keys() {
        let mut config = ScannerConfig::default();
        config.apply_env(|name| (name == VIRUSTOTAL_KEY_ENV).then(|| "vt-key".to_string()));
        assert_eq!(config.credential(CheckId::VirusTotal), Some("vt-key"));
        assert!(config.credential(CheckId::SafeBrowsing).is_none());
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "provider_timeout_secs": 45, "endpoints": { "ssl_labs": "http://localhost:9000" } }"#).unwrap();

        let config = ScannerConfig::from_file(&path).unwrap();
        assert_eq!(config.provider_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.endpoints.ssl_labs, "http://localhost:9000");
        assert_eq!(config.endpoints.observatory, EndpointConfig::default().observatory);
        assert_eq!(config.observatory_poll_attempts, 10);
    }

    #[test]
    fn missing_file_means_defaults_and_bad_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = ScannerConfig::from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ScannerConfig::default());

        let bad = dir.path().join(CONFIG_FILE);
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(ScannerConfig::from_file(&bad), Err(ScanError::InvalidConfiguration(_))));
    }
}

// src/core/scanner/safe_browsing_scanner.rs

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::CheckProvider;
use crate::config::ScannerConfig;
use crate::core::error::ProviderError;
use crate::core::models::{CheckId, CheckResult, SafeBrowsingResult, ScanTarget};

const THREAT_TYPES: &[&str] = &["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE", "POTENTIALLY_HARMFUL_APPLICATION"];

#[derive(Debug, Deserialize)]
struct ThreatMatchesResponse {
    #[serde(default)]
    matches: Vec<serde_json::Value>,
}

/// Looks the target URL up in Google Safe Browsing v4. Requires an API key.
pub struct SafeBrowsingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SafeBrowsingProvider {
    pub fn new(client: reqwest::Client, config: &ScannerConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.safe_browsing.trim_end_matches('/').to_string(),
            api_key: config.credential(CheckId::SafeBrowsing).map(str::to_string),
        }
    }
}

#[async_trait]
impl CheckProvider for SafeBrowsingProvider {
    fn check_id(&self) -> CheckId {
        CheckId::SafeBrowsing
    }

    fn requires_credential(&self) -> bool {
        true
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Google Safe Browsing API key not configured.");
            return Ok(CheckResult::key_missing(CheckId::SafeBrowsing));
        };
        info!(url = %target.url, "Starting Google Safe Browsing check.");

        let body = json!({
            "client": { "clientId": "webguard-scanner", "clientVersion": env!("CARGO_PKG_VERSION") },
            "threatInfo": {
                "threatTypes": THREAT_TYPES,
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": target.url }]
            }
        });

        let response = self
            .client
            .post(format!("{}/v4/threatMatches:find", self.base_url))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let found: ThreatMatchesResponse = response.json().await?;
        let safe = found.matches.is_empty();
        info!(threats = found.matches.len(), "Google Safe Browsing check finished.");
        Ok(CheckResult::SafeBrowsing(SafeBrowsingResult {
            safe,
            message: if safe { "No threats found" } else { "Threats detected" }.to_string(),
            threats: found.matches,
        }))
    }
}

// src/core/scanner/virustotal_scanner.rs

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::CheckProvider;
use crate::config::ScannerConfig;
use crate::core::error::ProviderError;
use crate::core::models::{CheckId, CheckResult, ScanTarget, VirusTotalResult};

#[derive(Debug, Deserialize)]
struct UrlScanResponse {
    #[serde(default)]
    positives: u32,
    #[serde(default)]
    total: u32,
    scan_date: Option<String>,
    permalink: Option<String>,
}

/// Submits the target URL to VirusTotal. Requires an API key.
pub struct VirusTotalProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl VirusTotalProvider {
    pub fn new(client: reqwest::Client, config: &ScannerConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.virus_total.trim_end_matches('/').to_string(),
            api_key: config.credential(CheckId::VirusTotal).map(str::to_string),
        }
    }
}

#[async_trait]
impl CheckProvider for VirusTotalProvider {
    fn check_id(&self) -> CheckId {
        CheckId::VirusTotal
    }

    fn requires_credential(&self) -> bool {
        true
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("VirusTotal API key not configured.");
            return Ok(CheckResult::key_missing(CheckId::VirusTotal));
        };
        info!(url = %target.url, "Starting VirusTotal check.");

        let response = self
            .client
            .post(format!("{}/vtapi/v2/url/scan", self.base_url))
            .form(&[("apikey", api_key), ("url", target.url.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: UrlScanResponse = response.json().await?;
        info!(positives = body.positives, total = body.total, "VirusTotal check finished.");
        Ok(CheckResult::VirusTotal(VirusTotalResult {
            clean: body.positives == 0,
            detections: body.positives,
            engines: body.total,
            scan_date: body.scan_date,
            permalink: body.permalink,
            message: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::MESSAGE_KEY_MISSING;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn target() -> ScanTarget {
        ScanTarget { url: "https://example.com".into(), hostname: "example.com".into() }
    }

    #[tokio::test]
    async fn positives_mark_the_site_unclean() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/vtapi/v2/url/scan")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("apikey".into(), "vt-key".into()),
                Matcher::UrlEncoded("url".into(), "https://example.com".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "positives": 3,
                    "total": 70,
                    "scan_date": "2024-01-01 00:00:00",
                    "permalink": "https://www.virustotal.com/url/abc"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = ScannerConfig::default().with_base_url(&server.url()).with_virustotal_key("vt-key");
        let result = VirusTotalProvider::new(reqwest::Client::new(), &config).invoke(&target()).await.unwrap();

        mock.assert_async().await;
        match result {
            CheckResult::VirusTotal(vt) => {
                assert!(!vt.clean);
                assert_eq!(vt.detections, 3);
                assert_eq!(vt.engines, 70);
                assert!(vt.permalink.is_some());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_key_returns_stub_without_request() {
        let provider = VirusTotalProvider::new(reqwest::Client::new(), &ScannerConfig::default());
        assert!(provider.requires_credential());

        match provider.invoke(&target()).await.unwrap() {
            CheckResult::VirusTotal(vt) => {
                assert!(vt.clean);
                assert_eq!(vt.message.as_deref(), Some(MESSAGE_KEY_MISSING));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}

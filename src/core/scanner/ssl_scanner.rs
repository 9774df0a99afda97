// src/core/scanner/ssl_scanner.rs

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::CheckProvider;
use crate::config::ScannerConfig;
use crate::core::error::ProviderError;
use crate::core::models::{CheckId, CheckResult, ScanTarget, SslLabsResult};

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    status: Option<String>,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Endpoint {
    grade: Option<String>,
    #[serde(default)]
    has_warnings: bool,
    #[serde(default)]
    is_exceptional: bool,
    #[serde(default)]
    progress: i32,
}

/// Queries the SSL Labs assessment API for the target host.
pub struct SslLabsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl SslLabsProvider {
    pub fn new(client: reqwest::Client, config: &ScannerConfig) -> Self {
        Self { client, base_url: config.endpoints.ssl_labs.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl CheckProvider for SslLabsProvider {
    fn check_id(&self) -> CheckId {
        CheckId::Ssl
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError> {
        info!(host = %target.hostname, "Starting SSL Labs check.");
        let url = format!("{}/api/v3/analyze", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("host", target.hostname.as_str()),
                ("publish", "off"),
                ("startNew", "on"),
                ("all", "done"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: AnalyzeResponse = response.json().await?;
        let result = summarize(body);
        info!(grade = %result.grade, warnings = result.has_warnings, "SSL Labs check finished.");
        Ok(CheckResult::Ssl(result))
    }
}

/// Reduces the assessment to the first endpoint. A missing grade means the
/// assessment is still running and is reported as "N/A".
fn summarize(body: AnalyzeResponse) -> SslLabsResult {
    let ready = body.status.as_deref() == Some("READY");
    match body.endpoints.into_iter().next() {
        Some(endpoint) => {
            debug!(grade = ?endpoint.grade, progress = endpoint.progress, "First SSL Labs endpoint.");
            SslLabsResult {
                grade: endpoint.grade.unwrap_or_else(|| "N/A".to_string()),
                has_warnings: endpoint.has_warnings,
                is_exceptional: endpoint.is_exceptional,
                progress: if ready { 100 } else { endpoint.progress.clamp(0, 100) as u8 },
            }
        }
        None => SslLabsResult {
            grade: "N/A".to_string(),
            has_warnings: false,
            is_exceptional: false,
            progress: if ready { 100 } else { 0 },
        },
    }
}

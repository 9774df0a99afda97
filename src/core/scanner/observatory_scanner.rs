// src/core/scanner/observatory_scanner.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::CheckProvider;
use crate::config::ScannerConfig;
use crate::core::error::ProviderError;
use crate::core::models::{CheckId, CheckResult, ObservatoryResult, ScanTarget};

#[derive(Debug, Deserialize)]
struct ScanState {
    state: Option<String>,
    grade: Option<String>,
    #[serde(default)]
    score: i32,
    #[serde(default)]
    tests_passed: u32,
    #[serde(default)]
    tests_failed: u32,
    likelihood_indicator: Option<String>,
}

/// Starts a Mozilla HTTP Observatory scan and polls until it finishes.
pub struct ObservatoryProvider {
    client: reqwest::Client,
    base_url: String,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl ObservatoryProvider {
    pub fn new(client: reqwest::Client, config: &ScannerConfig) -> Self {
        Self {
            client,
            base_url: config.endpoints.observatory.trim_end_matches('/').to_string(),
            poll_attempts: config.observatory_poll_attempts,
            poll_interval: config.observatory_poll_interval(),
        }
    }

    async fn fetch_state(&self, url: &str, host: &str) -> Result<ScanState, ProviderError> {
        let response = self.client.get(url).query(&[("host", host)]).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CheckProvider for ObservatoryProvider {
    fn check_id(&self) -> CheckId {
        CheckId::Observatory
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError> {
        let host = target.hostname.as_str();
        info!(host, "Starting Mozilla Observatory check.");
        let url = format!("{}/api/v1/analyze", self.base_url);

        let started = self.client.post(&url).query(&[("host", host)]).send().await?;
        if !started.status().is_success() {
            return Err(ProviderError::Status(started.status().as_u16()));
        }

        for attempt in 1..=self.poll_attempts {
            let state = self.fetch_state(&url, host).await?;
            debug!(attempt, state = ?state.state, "Polled Observatory scan.");

            if state.state.as_deref() == Some("FINISHED") {
                info!(grade = ?state.grade, score = state.score, "Mozilla Observatory check finished.");
                return Ok(CheckResult::Observatory(ObservatoryResult {
                    grade: state.grade.unwrap_or_else(|| "N/A".to_string()),
                    score: state.score,
                    tests_passed: state.tests_passed,
                    tests_failed: state.tests_failed,
                    likelihood_indicator: state.likelihood_indicator,
                }));
            }

            if attempt < self.poll_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        warn!(attempts = self.poll_attempts, "Observatory scan did not finish in time.");
        Ok(CheckResult::Observatory(ObservatoryResult::pending()))
    }
}

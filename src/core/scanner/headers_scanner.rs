// src/core/scanner/headers_scanner.rs

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use super::CheckProvider;
use crate::config::ScannerConfig;
use crate::core::error::ProviderError;
use crate::core::knowledge_base::TRACKED_HEADERS;
use crate::core::models::{CheckId, CheckResult, ScanTarget, SecurityHeadersResult};

/// Any element carrying a `grade-X` class holds the report grade.
static GRADE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"[class*="grade-"]"#).unwrap());

/// Per tracked header: (name, "missing" pattern, "present" pattern). Both
/// patterns match the header name followed by the status on the same line.
static HEADER_PATTERNS: Lazy<Vec<(&'static str, Regex, Regex)>> = Lazy::new(|| {
    TRACKED_HEADERS
        .iter()
        .map(|name| {
            let escaped = regex::escape(name);
            (
                *name,
                Regex::new(&format!(r"(?i){}.*missing", escaped)).unwrap(),
                Regex::new(&format!(r"(?i){}.*present", escaped)).unwrap(),
            )
        })
        .collect()
});

/// Scrapes the SecurityHeaders.com report page for the target URL.
pub struct SecurityHeadersProvider {
    client: reqwest::Client,
    base_url: String,
}

impl SecurityHeadersProvider {
    pub fn new(client: reqwest::Client, config: &ScannerConfig) -> Self {
        Self { client, base_url: config.endpoints.security_headers.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl CheckProvider for SecurityHeadersProvider {
    fn check_id(&self) -> CheckId {
        CheckId::Headers
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError> {
        info!(url = %target.url, "Starting SecurityHeaders check.");

        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[("q", target.url.as_str()), ("followRedirects", "on")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        debug!(bytes = html.len(), "Received SecurityHeaders report.");
        let result = parse_report(&html);
        info!(grade = %result.grade, missing = result.missing_headers.len(), "SecurityHeaders check finished.");
        Ok(CheckResult::Headers(result))
    }
}

/// Extracts the grade (defaulting to "F" when none is shown) and the
/// missing/present status of each tracked header.
fn parse_report(html: &str) -> SecurityHeadersResult {
    let document = Html::parse_document(html);
    let grade = document
        .select(&GRADE_SELECTOR)
        .flat_map(|el| el.value().classes())
        .filter_map(|class| class.strip_prefix("grade-"))
        .find(|g| !g.is_empty() && g.chars().all(|c| ('A'..='F').contains(&c)))
        .unwrap_or("F")
        .to_string();

    let mut missing_headers = Vec::new();
    let mut present_headers = Vec::new();
    for (name, missing, present) in HEADER_PATTERNS.iter() {
        if missing.is_match(html) {
            debug!(header = name, "Header reported missing.");
            missing_headers.push(name.to_string());
        }
        if present.is_match(html) {
            present_headers.push(name.to_string());
        }
    }

    SecurityHeadersResult { grade, missing_headers, present_headers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const REPORT: &str = r#"<html><body>
        <div class="score"><span class="grade-D">D</span></div>
        <table>
          <tr><th>Strict-Transport-Security</th><td>present</td></tr>
          <tr><th>Content-Security-Policy</th><td>missing</td></tr>
          <tr><th>X-Frame-Options</th><td>missing</td></tr>
          <tr><th>Referrer-Policy</th><td>missing</td></tr>
          <tr><th>X-Content-Type-Options</th><td>present</td></tr>
        </table>
    </body></html>"#;

    #[test]
    fn parses_grade_and_header_status() {
        let result = parse_report(REPORT);
        assert_eq!(result.grade, "D");
        assert_eq!(result.missing_headers, vec!["Content-Security-Policy", "X-Frame-Options", "Referrer-Policy"]);
        assert_eq!(result.present_headers, vec!["X-Content-Type-Options", "Strict-Transport-Security"]);
    }

    #[test]
    fn page_without_grade_defaults_to_f() {
        let result = parse_report("<html><body>Too many requests</body></html>");
        assert_eq!(result.grade, "F");
        assert!(result.missing_headers.is_empty());
    }

    #[tokio::test]
    async fn fetches_report_for_the_full_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "https://example.com/app".into()),
                Matcher::UrlEncoded("followRedirects".into(), "on".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(REPORT)
            .create_async()
            .await;

        let config = ScannerConfig::default().with_base_url(&server.url());
        let provider = SecurityHeadersProvider::new(reqwest::Client::new(), &config);
        let target = ScanTarget { url: "https://example.com/app".into(), hostname: "example.com".into() };

        let result = provider.invoke(&target).await.unwrap();
        mock.assert_async().await;
        assert!(matches!(result, CheckResult::Headers(ref h) if h.grade == "D"));
    }
}

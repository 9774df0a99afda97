// src/core/scanner/mod.rs

// Public interface of the `scanner` module: the provider clients, the
// orchestrator that runs them concurrently and the end-to-end `Scanner`.
pub mod headers_scanner;
pub mod observatory_scanner;
pub mod safe_browsing_scanner;
pub mod ssl_scanner;
pub mod virustotal_scanner;

use async_trait::async_trait;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::ScannerConfig;
use crate::core::error::{ProviderError, ScanError};
use crate::core::fallback::generate_fallback;
use crate::core::models::{CheckId, CheckResult, CheckResultMap, ScanDepth, ScanReport, ScanTarget};
use crate::core::synthesizer::synthesize;
use crate::core::target::parse_target;
use crate::core::{scoring, tier};
use self::headers_scanner::SecurityHeadersProvider;
use self::observatory_scanner::ObservatoryProvider;
use self::safe_browsing_scanner::SafeBrowsingProvider;
use self::ssl_scanner::SslLabsProvider;
use self::virustotal_scanner::VirusTotalProvider;

/// One external security check.
#[async_trait]
pub trait CheckProvider: Send + Sync {
    fn check_id(&self) -> CheckId;

    /// Whether the check needs an API key from the configuration.
    fn requires_credential(&self) -> bool {
        false
    }

    async fn invoke(&self, target: &ScanTarget) -> Result<CheckResult, ProviderError>;

    /// The degraded result reported in place of a failed call.
    fn unavailable(&self, reason: &str) -> CheckResult {
        warn!(check = %self.check_id(), reason, "Check unavailable.");
        CheckResult::unavailable(self.check_id())
    }
}

/// Builds the HTTP client shared by every provider.
pub fn build_client(config: &ScannerConfig) -> Result<reqwest::Client, ScanError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| ScanError::InvalidConfiguration(format!("HTTP client: {}", e)))
}

/// The provider registered for each check.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: BTreeMap<CheckId, Arc<dyn CheckProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The real HTTP clients for every check.
    pub fn from_config(config: &ScannerConfig) -> Result<Self, ScanError> {
        let client = build_client(config)?;
        Ok(Self::new()
            .with(SslLabsProvider::new(client.clone(), config))
            .with(SecurityHeadersProvider::new(client.clone(), config))
            .with(VirusTotalProvider::new(client.clone(), config))
            .with(SafeBrowsingProvider::new(client.clone(), config))
            .with(ObservatoryProvider::new(client, config)))
    }

    /// Registers `provider` under its own check id, replacing any previous one.
    pub fn with<P: CheckProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.insert(provider.check_id(), Arc::new(provider));
        self
    }

    pub fn get(&self, check: CheckId) -> Option<&Arc<dyn CheckProvider>> {
        self.providers.get(&check)
    }
}

/// Runs the checks selected for a depth concurrently and collects their results.
pub struct Orchestrator {
    config: ScannerConfig,
    providers: ProviderSet,
}

impl Orchestrator {
    pub fn new(config: ScannerConfig, providers: ProviderSet) -> Self {
        Self { config, providers }
    }

    /// Every selected check gets exactly one entry. A provider error or
    /// timeout degrades only that entry; a provider task that panics, or a
    /// check with no registered provider, fails the whole run.
    pub async fn run(&self, target: &ScanTarget, depth: ScanDepth) -> Result<CheckResultMap, ScanError> {
        // Resolve every provider first, so a missing one fails before any task starts.
        let selected = tier::select_checks(depth)
            .iter()
            .map(|&check| {
                self.providers
                    .get(check)
                    .map(|provider| (check, provider))
                    .ok_or_else(|| ScanError::Pipeline(format!("no provider registered for {}", check)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = CheckResultMap::new();
        let mut handles = Vec::new();

        for (check, provider) in selected {
            if provider.requires_credential() && self.config.credential(check).is_none() {
                info!(check = %check, "Credential not configured, skipping provider call.");
                results.insert(CheckResult::key_missing(check));
                continue;
            }

            let provider = Arc::clone(provider);
            let target = target.clone();
            let timeout = self.config.provider_timeout();
            handles.push((check, tokio::spawn(invoke_isolated(provider, target, timeout))));
        }

        // Await every handle before deciding, so no task outlives the run.
        let mut failure = None;
        for (check, handle) in handles {
            match handle.await {
                Ok(result) => {
                    results.insert(result);
                }
                Err(e) => {
                    error!(check = %check, error = %e, "Check task aborted.");
                    if failure.is_none() {
                        failure = Some(ScanError::Pipeline(format!("{} check aborted: {}", check, e)));
                    }
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

async fn invoke_isolated(provider: Arc<dyn CheckProvider>, target: ScanTarget, timeout: Option<Duration>) -> CheckResult {
    let check = provider.check_id();
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.invoke(&target))
            .await
            .unwrap_or_else(|_| Err(ProviderError::Timeout(limit))),
        None => provider.invoke(&target).await,
    };

    match outcome {
        Ok(result) if result.check_id() == check => result,
        Ok(result) => provider.unavailable(&format!("returned a {} result", result.check_id())),
        Err(e) => provider.unavailable(&e.to_string()),
    }
}

/// Validates, orchestrates, scores and synthesises a scan into a report.
///
/// Only validation errors are returned as `Err`; a failed pipeline yields a
/// fallback report instead.
pub struct Scanner {
    orchestrator: Orchestrator,
    rng: Mutex<StdRng>,
}

impl Scanner {
    /// A scanner backed by the real HTTP providers.
    pub fn new(config: ScannerConfig) -> Result<Self, ScanError> {
        let providers = ProviderSet::from_config(&config)?;
        Ok(Self::with_providers(config, providers))
    }

    pub fn with_providers(config: ScannerConfig, providers: ProviderSet) -> Self {
        Self { orchestrator: Orchestrator::new(config, providers), rng: Mutex::new(StdRng::from_os_rng()) }
    }

    /// Makes fallback reports reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)), ..self }
    }

    pub async fn scan(&self, url: &str, depth: ScanDepth) -> Result<ScanReport, ScanError> {
        let target = parse_target(url)?;
        info!(url = %target.url, depth = %depth, "Scan started.");
        let started = Instant::now();

        match self.orchestrator.run(&target, depth).await {
            Ok(checks) => {
                let report = build_report(&target, depth, checks, started.elapsed());
                info!(score = report.overall_score, grade = %report.grade, "Scan finished.");
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "Scan pipeline failed, generating fallback report.");
                let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                Ok(generate_fallback(&target.url, depth, Some(e.to_string()), &mut *rng))
            }
        }
    }
}

fn build_report(target: &ScanTarget, depth: ScanDepth, checks: CheckResultMap, elapsed: Duration) -> ScanReport {
    let overall_score = scoring::score(&checks, depth);
    let findings = synthesize(&checks, depth);

    ScanReport {
        url: target.url.clone(),
        hostname: Some(target.hostname.clone()),
        timestamp: Utc::now(),
        scan_depth: depth,
        overall_score,
        grade: scoring::score_to_grade(overall_score).to_string(),
        vulnerabilities: findings.vulnerabilities,
        recommendations: findings.recommendations,
        details: findings.details,
        tests_performed: checks.ids().map(|c| tier::test_name(c).to_string()).collect(),
        scan_duration: format!("{} seconds", elapsed.as_secs()),
        checks: Some(checks),
        fallback: false,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{
        GRADE_ERROR, MESSAGE_KEY_MISSING, SafeBrowsingResult, SecurityHeadersResult, SslLabsResult, VirusTotalResult,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        result: CheckResult,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl StaticProvider {
        fn new(result: CheckResult) -> Self {
            Self { result, delay: Duration::ZERO, calls: Arc::new(AtomicUsize::new(0)) }
        }

        fn delayed(result: CheckResult, delay: Duration) -> Self {
            Self { delay, ..Self::new(result) }
        }
    }

    #[async_trait]
    impl CheckProvider for StaticProvider {
        fn check_id(&self) -> CheckId {
            self.result.check_id()
        }

        fn requires_credential(&self) -> bool {
            matches!(self.result.check_id(), CheckId::VirusTotal | CheckId::SafeBrowsing)
        }

        async fn invoke(&self, _target: &ScanTarget) -> Result<CheckResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.result.clone())
        }
    }

    struct FailingProvider(CheckId);

    #[async_trait]
    impl CheckProvider for FailingProvider {
        fn check_id(&self) -> CheckId {
            self.0
        }

        async fn invoke(&self, _target: &ScanTarget) -> Result<CheckResult, ProviderError> {
            Err(ProviderError::Status(503))
        }
    }

    struct PanickingProvider(CheckId);

    #[async_trait]
    impl CheckProvider for PanickingProvider {
        fn check_id(&self) -> CheckId {
            self.0
        }

        async fn invoke(&self, _target: &ScanTarget) -> Result<CheckResult, ProviderError> {
            panic!("provider exploded")
        }
    }

    /// Returns a result belonging to another check.
    struct ConfusedProvider;

    #[async_trait]
    impl CheckProvider for ConfusedProvider {
        fn check_id(&self) -> CheckId {
            CheckId::Ssl
        }

        async fn invoke(&self, _target: &ScanTarget) -> Result<CheckResult, ProviderError> {
            Ok(headers("A"))
        }
    }

    fn ssl(grade: &str) -> CheckResult {
        CheckResult::Ssl(SslLabsResult { grade: grade.into(), has_warnings: false, is_exceptional: false, progress: 100 })
    }

    fn headers(grade: &str) -> CheckResult {
        CheckResult::Headers(SecurityHeadersResult { grade: grade.into(), missing_headers: vec![], present_headers: vec![] })
    }

    fn clean_virus_total() -> CheckResult {
        CheckResult::VirusTotal(VirusTotalResult {
            clean: true,
            detections: 0,
            engines: 70,
            scan_date: None,
            permalink: None,
            message: None,
        })
    }

    fn safe_browsing() -> CheckResult {
        CheckResult::SafeBrowsing(SafeBrowsingResult { safe: true, threats: vec![], message: "No threats found".into() })
    }

    fn keyed_config() -> ScannerConfig {
        ScannerConfig::default().with_virustotal_key("vt").with_safe_browsing_key("sb")
    }

    #[tokio::test]
    async fn basic_scan_of_b_and_c_grades() {
        let providers = ProviderSet::new().with(StaticProvider::new(ssl("B"))).with(StaticProvider::new(headers("C")));
        let scanner = Scanner::with_providers(ScannerConfig::default(), providers);

        let report = scanner.scan("https://example.com", ScanDepth::Basic).await.unwrap();

        assert_eq!(report.overall_score, 73);
        assert_eq!(report.grade, "C");
        assert!(!report.fallback);
        assert_eq!(report.hostname.as_deref(), Some("example.com"));
        assert_eq!(
            report.tests_performed,
            vec![tier::test_name(CheckId::Ssl), tier::test_name(CheckId::Headers)]
        );
        assert_eq!(report.checks.as_ref().map(|c| c.len()), Some(2));
    }

    #[tokio::test]
    async fn failing_provider_degrades_only_its_own_check() {
        let providers = ProviderSet::new()
            .with(FailingProvider(CheckId::Ssl))
            .with(StaticProvider::new(headers("A")))
            .with(StaticProvider::new(clean_virus_total()))
            .with(StaticProvider::new(safe_browsing()));
        let scanner = Scanner::with_providers(keyed_config(), providers);

        let report = scanner.scan("https://example.com", ScanDepth::Advanced).await.unwrap();
        let checks = report.checks.unwrap();

        assert!(!report.fallback);
        assert_eq!(checks.len(), 4);
        assert_eq!(checks.ssl().unwrap().grade, GRADE_ERROR);
        assert_eq!(checks.headers().unwrap().grade, "A");
        assert!(checks.virus_total().unwrap().clean);
        assert!(checks.safe_browsing().unwrap().safe);
    }

    #[tokio::test]
    async fn missing_key_inserts_stub_without_calling_provider() {
        let virus_total = StaticProvider::new(clean_virus_total());
        let vt_calls = Arc::clone(&virus_total.calls);
        let providers = ProviderSet::new()
            .with(StaticProvider::new(ssl("A")))
            .with(StaticProvider::new(headers("A")))
            .with(virus_total)
            .with(StaticProvider::new(safe_browsing()));
        let scanner = Scanner::with_providers(ScannerConfig::default().with_safe_browsing_key("sb"), providers);

        let report = scanner.scan("https://example.com", ScanDepth::Advanced).await.unwrap();
        let checks = report.checks.as_ref().unwrap();

        assert_eq!(vt_calls.load(Ordering::SeqCst), 0);
        assert_eq!(checks.virus_total().unwrap().message.as_deref(), Some(MESSAGE_KEY_MISSING));
        assert!(checks.safe_browsing().unwrap().message != MESSAGE_KEY_MISSING);
        assert_eq!(report.tests_performed.len(), 4);
    }

    #[tokio::test]
    async fn panicking_provider_yields_fallback_report() {
        let providers = ProviderSet::new().with(PanickingProvider(CheckId::Ssl)).with(StaticProvider::new(headers("A")));
        let scanner = Scanner::with_providers(ScannerConfig::default(), providers).with_seed(7);

        let report = scanner.scan("https://example.com", ScanDepth::Basic).await.unwrap();

        assert!(report.fallback);
        assert!(report.checks.is_none());
        assert!(report.error.is_some());
        assert!((60..=89).contains(&report.overall_score));
        assert_eq!(report.tests_performed, tier::tests_performed(ScanDepth::Basic));
    }

    #[tokio::test]
    async fn fallback_is_reproducible_with_a_seed() {
        let build = || {
            let providers = ProviderSet::new().with(PanickingProvider(CheckId::Ssl)).with(StaticProvider::new(headers("A")));
            Scanner::with_providers(ScannerConfig::default(), providers).with_seed(42)
        };

        let first = build().scan("https://example.com", ScanDepth::Full).await.unwrap();
        let second = build().scan("https://example.com", ScanDepth::Full).await.unwrap();
        assert_eq!(first.overall_score, second.overall_score);
    }

    #[tokio::test]
    async fn unregistered_provider_fails_before_any_provider_starts() {
        let slow = StaticProvider::delayed(ssl("A"), Duration::from_millis(20));
        let calls = Arc::clone(&slow.calls);
        let orchestrator = Orchestrator::new(ScannerConfig::default(), ProviderSet::new().with(slow));
        let target = parse_target("https://example.com").unwrap();

        let err = orchestrator.run(&target, ScanDepth::Basic).await.unwrap_err();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(matches!(err, ScanError::Pipeline(ref msg) if msg.contains("headers")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    async fn assert_fallback_matches_canned_tier(depth: ScanDepth, floor: u8, counts: (usize, usize, usize)) {
        let providers = ProviderSet::new()
            .with(PanickingProvider(CheckId::Ssl))
            .with(StaticProvider::new(headers("A")))
            .with(StaticProvider::new(clean_virus_total()))
            .with(StaticProvider::new(safe_browsing()))
            .with(StaticProvider::new(CheckResult::Observatory(crate::core::models::ObservatoryResult::pending())));
        let scanner = Scanner::with_providers(ScannerConfig::default(), providers).with_seed(11);

        let report = scanner.scan("https://example.com", depth).await.unwrap();
        let expected = generate_fallback("https://example.com", depth, None, &mut StdRng::seed_from_u64(11));

        assert!(report.fallback);
        assert!(report.overall_score >= floor);
        assert_eq!(report.overall_score, expected.overall_score);
        assert_eq!(report.grade, expected.grade);
        assert_eq!(
            (report.vulnerabilities.len(), report.recommendations.len(), report.details.len()),
            counts
        );
        assert_eq!(report.vulnerabilities, expected.vulnerabilities);
        assert_eq!(report.recommendations, expected.recommendations);
        assert_eq!(report.details, expected.details);
        assert_eq!(report.tests_performed, tier::tests_performed(depth));
        assert_eq!(report.scan_duration, tier::scan_duration(depth));
    }

    #[tokio::test]
    async fn advanced_fallback_uses_canned_tier_content() {
        assert_fallback_matches_canned_tier(ScanDepth::Advanced, 40, (3, 3, 4)).await;
    }

    #[tokio::test]
    async fn full_fallback_uses_canned_tier_content() {
        assert_fallback_matches_canned_tier(ScanDepth::Full, 30, (5, 5, 6)).await;
    }

    #[tokio::test]
    async fn mismatched_result_is_replaced_by_degraded_shape() {
        let providers = ProviderSet::new().with(ConfusedProvider).with(StaticProvider::new(headers("B")));
        let orchestrator = Orchestrator::new(ScannerConfig::default(), providers);
        let target = parse_target("https://example.com").unwrap();

        let checks = orchestrator.run(&target, ScanDepth::Basic).await.unwrap();
        assert_eq!(checks.ssl().unwrap().grade, GRADE_ERROR);
        assert_eq!(checks.headers().unwrap().grade, "B");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_provider_runs() {
        let provider = StaticProvider::new(ssl("A"));
        let calls = Arc::clone(&provider.calls);
        let scanner = Scanner::with_providers(ScannerConfig::default(), ProviderSet::new().with(provider));

        let err = scanner.scan("not a url", ScanDepth::Basic).await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput { ref input, .. } if input == "not a url"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn checks_run_concurrently() {
        let delay = Duration::from_millis(300);
        let providers = ProviderSet::new()
            .with(StaticProvider::delayed(ssl("A"), delay))
            .with(StaticProvider::delayed(headers("A"), delay))
            .with(StaticProvider::delayed(clean_virus_total(), delay))
            .with(StaticProvider::delayed(safe_browsing(), delay))
            .with(StaticProvider::delayed(
                CheckResult::Observatory(crate::core::models::ObservatoryResult::pending()),
                delay,
            ));
        let orchestrator = Orchestrator::new(keyed_config(), providers);
        let target = parse_target("https://example.com").unwrap();

        let started = Instant::now();
        let checks = orchestrator.run(&target, ScanDepth::Full).await.unwrap();

        assert_eq!(checks.len(), 5);
        assert!(started.elapsed() < Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn slow_provider_times_out_to_degraded_shape() {
        let mut config = ScannerConfig::default();
        config.provider_timeout_secs = Some(1);
        let providers = ProviderSet::new()
            .with(StaticProvider::delayed(ssl("A"), Duration::from_secs(30)))
            .with(StaticProvider::new(headers("A")));
        let orchestrator = Orchestrator::new(config, providers);
        let target = parse_target("https://example.com").unwrap();

        let checks = orchestrator.run(&target, ScanDepth::Basic).await.unwrap();
        assert_eq!(checks.ssl().unwrap().grade, GRADE_ERROR);
        assert_eq!(checks.headers().unwrap().grade, "A");
    }
}

// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumIter};

// --- Scan Configuration ---

/// The depth tier requested by the caller. Each tier runs every check of the
/// tiers below it plus its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanDepth {
    Basic,
    Advanced,
    Full,
}

/// Identifies one of the external security checks.
///
/// The declaration order is the tier order, so a `BTreeMap<CheckId, _>`
/// iterates basic checks first, then advanced, then full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CheckId {
    Ssl,
    Headers,
    VirusTotal,
    SafeBrowsing,
    Observatory,
}

/// A validated scan target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub url: String,
    pub hostname: String,
}

// --- Check Results ---

pub const GRADE_ERROR: &str = "ERROR";
pub const GRADE_PENDING: &str = "PENDING";
pub const MESSAGE_KEY_MISSING: &str = "API key not configured";
pub const MESSAGE_UNAVAILABLE: &str = "API unavailable";

/// SSL Labs endpoint assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslLabsResult {
    pub grade: String,
    #[serde(default)]
    pub has_warnings: bool,
    #[serde(default)]
    pub is_exceptional: bool,
    #[serde(default)]
    pub progress: u8,
}

impl SslLabsResult {
    pub fn unavailable() -> Self {
        Self { grade: GRADE_ERROR.to_string(), has_warnings: true, is_exceptional: false, progress: 0 }
    }
}

/// SecurityHeaders.com grade together with the headers it reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHeadersResult {
    pub grade: String,
    #[serde(default)]
    pub missing_headers: Vec<String>,
    #[serde(default)]
    pub present_headers: Vec<String>,
}

impl SecurityHeadersResult {
    pub fn unavailable() -> Self {
        Self { grade: GRADE_ERROR.to_string(), missing_headers: Vec::new(), present_headers: Vec::new() }
    }
}

/// VirusTotal URL scan verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirusTotalResult {
    pub clean: bool,
    #[serde(default)]
    pub detections: u32,
    #[serde(default)]
    pub engines: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VirusTotalResult {
    /// Degraded shape: reported clean with zero engines, carrying the reason.
    pub fn unavailable(message: &str) -> Self {
        Self {
            clean: true,
            detections: 0,
            engines: 0,
            scan_date: None,
            permalink: None,
            message: Some(message.to_string()),
        }
    }
}

/// Google Safe Browsing lookup verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeBrowsingResult {
    pub safe: bool,
    #[serde(default)]
    pub threats: Vec<serde_json::Value>,
    #[serde(default)]
    pub message: String,
}

impl SafeBrowsingResult {
    pub fn unavailable(message: &str) -> Self {
        Self { safe: true, threats: Vec::new(), message: message.to_string() }
    }
}

/// Mozilla Observatory summary. `score` is the Observatory's native score,
/// which ranges roughly from -100 to +100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservatoryResult {
    pub grade: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub tests_passed: u32,
    #[serde(default)]
    pub tests_failed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood_indicator: Option<String>,
}

impl ObservatoryResult {
    pub fn unavailable() -> Self {
        Self::with_grade(GRADE_ERROR)
    }

    pub fn pending() -> Self {
        Self::with_grade(GRADE_PENDING)
    }

    fn with_grade(grade: &str) -> Self {
        Self { grade: grade.to_string(), score: 0, tests_passed: 0, tests_failed: 0, likelihood_indicator: None }
    }
}

/// The result of a single check. Degraded results ("ERROR" grades, "API key
/// not configured" messages) are ordinary values of the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    Ssl(SslLabsResult),
    Headers(SecurityHeadersResult),
    VirusTotal(VirusTotalResult),
    SafeBrowsing(SafeBrowsingResult),
    Observatory(ObservatoryResult),
}

impl CheckResult {
    pub fn check_id(&self) -> CheckId {
        match self {
            CheckResult::Ssl(_) => CheckId::Ssl,
            CheckResult::Headers(_) => CheckId::Headers,
            CheckResult::VirusTotal(_) => CheckId::VirusTotal,
            CheckResult::SafeBrowsing(_) => CheckId::SafeBrowsing,
            CheckResult::Observatory(_) => CheckId::Observatory,
        }
    }

    /// The degraded shape used when a provider failed or could not be reached.
    pub fn unavailable(id: CheckId) -> Self {
        match id {
            CheckId::Ssl => CheckResult::Ssl(SslLabsResult::unavailable()),
            CheckId::Headers => CheckResult::Headers(SecurityHeadersResult::unavailable()),
            CheckId::VirusTotal => CheckResult::VirusTotal(VirusTotalResult::unavailable(MESSAGE_UNAVAILABLE)),
            CheckId::SafeBrowsing => CheckResult::SafeBrowsing(SafeBrowsingResult::unavailable(MESSAGE_UNAVAILABLE)),
            CheckId::Observatory => CheckResult::Observatory(ObservatoryResult::unavailable()),
        }
    }

    /// The stub inserted when a check needs a credential that is not configured.
    pub fn key_missing(id: CheckId) -> Self {
        match id {
            CheckId::VirusTotal => CheckResult::VirusTotal(VirusTotalResult::unavailable(MESSAGE_KEY_MISSING)),
            CheckId::SafeBrowsing => CheckResult::SafeBrowsing(SafeBrowsingResult::unavailable(MESSAGE_KEY_MISSING)),
            other => CheckResult::unavailable(other),
        }
    }

    fn from_value(id: CheckId, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match id {
            CheckId::Ssl => CheckResult::Ssl(serde_json::from_value(value)?),
            CheckId::Headers => CheckResult::Headers(serde_json::from_value(value)?),
            CheckId::VirusTotal => CheckResult::VirusTotal(serde_json::from_value(value)?),
            CheckId::SafeBrowsing => CheckResult::SafeBrowsing(serde_json::from_value(value)?),
            CheckId::Observatory => CheckResult::Observatory(serde_json::from_value(value)?),
        })
    }
}

impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CheckResult::Ssl(r) => r.serialize(serializer),
            CheckResult::Headers(r) => r.serialize(serializer),
            CheckResult::VirusTotal(r) => r.serialize(serializer),
            CheckResult::SafeBrowsing(r) => r.serialize(serializer),
            CheckResult::Observatory(r) => r.serialize(serializer),
        }
    }
}

/// Per-check results for one scan, keyed by the check that produced them.
///
/// The key is always taken from the result's own variant, so an entry can
/// never hold another provider's result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckResultMap {
    entries: BTreeMap<CheckId, CheckResult>,
}

impl CheckResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, result: CheckResult) -> Option<CheckResult> {
        self.entries.insert(result.check_id(), result)
    }

    pub fn get(&self, id: CheckId) -> Option<&CheckResult> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: CheckId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Present check ids, in tier order.
    pub fn ids(&self) -> impl Iterator<Item = CheckId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.values()
    }

    pub fn ssl(&self) -> Option<&SslLabsResult> {
        match self.get(CheckId::Ssl) {
            Some(CheckResult::Ssl(r)) => Some(r),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&SecurityHeadersResult> {
        match self.get(CheckId::Headers) {
            Some(CheckResult::Headers(r)) => Some(r),
            _ => None,
        }
    }

    pub fn virus_total(&self) -> Option<&VirusTotalResult> {
        match self.get(CheckId::VirusTotal) {
            Some(CheckResult::VirusTotal(r)) => Some(r),
            _ => None,
        }
    }

    pub fn safe_browsing(&self) -> Option<&SafeBrowsingResult> {
        match self.get(CheckId::SafeBrowsing) {
            Some(CheckResult::SafeBrowsing(r)) => Some(r),
            _ => None,
        }
    }

    pub fn observatory(&self) -> Option<&ObservatoryResult> {
        match self.get(CheckId::Observatory) {
            Some(CheckResult::Observatory(r)) => Some(r),
            _ => None,
        }
    }
}

impl FromIterator<CheckResult> for CheckResultMap {
    fn from_iter<I: IntoIterator<Item = CheckResult>>(iter: I) -> Self {
        let mut map = CheckResultMap::new();
        for result in iter {
            map.insert(result);
        }
        map
    }
}

impl Serialize for CheckResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, result) in &self.entries {
            map.serialize_entry(id, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CheckResultMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<CheckId, serde_json::Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(id, value)| CheckResult::from_value(id, value).map_err(de::Error::custom))
            .collect()
    }
}

// --- Findings ---

/// Severity of a vulnerability, also used as the priority of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetailStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub category: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Severity,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub category: String,
    pub description: String,
    pub status: DetailStatus,
    pub source: String,
}

// --- Main Report ---

/// The terminal artifact of a scan. Serialised verbatim by the JSON export,
/// so field names are part of the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub scan_depth: ScanDepth,
    pub overall_score: u8,
    pub grade: String,
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendations: Vec<Recommendation>,
    pub details: Vec<Detail>,
    pub tests_performed: Vec<String>,
    pub scan_duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<CheckResultMap>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ScanReport {
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities.iter().filter(|v| v.severity == severity).count()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

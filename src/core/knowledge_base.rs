// src/core/knowledge_base.rs

//! Static, read-only texts behind every finding the synthesizer can emit:
//! categories, provider display names, header criticality and the
//! remediation guides attached to recommendations.
//! Keeping the wording here leaves the synthesis rules free of prose.

use crate::core::models::{CheckId, Severity};
use std::fmt;

/// High-level grouping of a finding, shown as its `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    SslTls,
    HttpHeaders,
    Malware,
    Reputation,
    WebSecurity,
    ContentSecurity,
    CookieSecurity,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::SslTls => write!(f, "SSL/TLS"),
            FindingCategory::HttpHeaders => write!(f, "HTTP Headers"),
            FindingCategory::Malware => write!(f, "Malware"),
            FindingCategory::Reputation => write!(f, "Reputation"),
            FindingCategory::WebSecurity => write!(f, "Web Security"),
            FindingCategory::ContentSecurity => write!(f, "Content Security"),
            FindingCategory::CookieSecurity => write!(f, "Cookie Security"),
        }
    }
}

/// Display name of the service behind a check, used as a finding's `source`.
pub fn source_name(check: CheckId) -> &'static str {
    match check {
        CheckId::Ssl => "SSL Labs",
        CheckId::Headers => "SecurityHeaders.com",
        CheckId::VirusTotal => "VirusTotal",
        CheckId::SafeBrowsing => "Google Safe Browsing",
        CheckId::Observatory => "Mozilla Observatory",
    }
}

/// Security headers reported by SecurityHeaders.com, with the severity of
/// their absence. Headers not listed here are `Medium`.
static HEADER_CRITICALITY: &[(&str, Severity)] = &[
    ("Content-Security-Policy", Severity::Critical),
    ("X-Frame-Options", Severity::Critical),
    ("Strict-Transport-Security", Severity::High),
    ("X-Content-Type-Options", Severity::High),
];

/// The headers looked for in a SecurityHeaders.com report.
pub static TRACKED_HEADERS: &[&str] = &[
    "Content-Security-Policy",
    "X-Frame-Options",
    "X-Content-Type-Options",
    "Strict-Transport-Security",
    "Referrer-Policy",
];

pub fn header_severity(header: &str) -> Severity {
    HEADER_CRITICALITY
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(header))
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Medium)
}

/// Title, explanation and fix for one kind of recommendation.
pub struct RemediationGuide {
    pub title: &'static str,
    pub description: &'static str,
    /// Fixed steps. Empty when the steps are derived from the scan data.
    pub steps: &'static [&'static str],
    pub link: &'static str,
}

pub static SSL_GUIDE: RemediationGuide = RemediationGuide {
    title: "Improve SSL Configuration",
    description: "Optimize your SSL/TLS configuration for better security.",
    steps: &[
        "Review SSL Labs detailed report",
        "Update to latest TLS version",
        "Use strong cipher suites",
        "Implement HSTS",
    ],
    link: "https://www.ssllabs.com/ssltest/",
};

pub static HEADERS_GUIDE: RemediationGuide = RemediationGuide {
    title: "Implement Missing Security Headers",
    description: "Add critical security headers to protect against common attacks.",
    steps: &[],
    link: "https://securityheaders.com/",
};

pub static MALWARE_GUIDE: RemediationGuide = RemediationGuide {
    title: "Address Malware Issues",
    description: "Your website has been flagged for potential malware.",
    steps: &[
        "Review VirusTotal detailed report",
        "Check for compromised files or scripts",
        "Scan server for malware",
        "Implement regular security scans",
    ],
    link: "https://www.virustotal.com/",
};

pub static SAFE_BROWSING_GUIDE: RemediationGuide = RemediationGuide {
    title: "Resolve Google Safe Browsing Issues",
    description: "Your site has been flagged by Google Safe Browsing.",
    steps: &[
        "Review Google Search Console for details",
        "Remove any malicious content",
        "Submit site for review",
        "Implement preventive security measures",
    ],
    link: "https://transparencyreport.google.com/safe-browsing/search",
};

pub static OBSERVATORY_GUIDE: RemediationGuide = RemediationGuide {
    title: "Address Mozilla Observatory Issues",
    description: "Improve your security posture based on Mozilla Observatory findings.",
    steps: &[
        "Review detailed Observatory report",
        "Fix failed security tests",
        "Implement recommended security practices",
        "Follow up with regular testing",
    ],
    link: "https://observatory.mozilla.org/",
};

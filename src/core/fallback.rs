// src/core/fallback.rs

//! Synthetic report used when the real scan pipeline fails. It performs no
//! I/O and cannot fail; the report is marked `fallback` so the caller can
//! disclose degraded operation.

use crate::core::knowledge_base::FindingCategory;
use crate::core::models::{
    Detail, DetailStatus, Recommendation, ScanDepth, ScanReport, Severity, Vulnerability,
};
use crate::core::scoring;
use crate::core::tier;
use chrono::Utc;
use rand::Rng;
use tracing::warn;

struct CannedVulnerability {
    severity: Severity,
    title: &'static str,
    description: &'static str,
    category: FindingCategory,
    source: &'static str,
}

struct CannedRecommendation {
    priority: Severity,
    title: &'static str,
    description: &'static str,
    steps: &'static [&'static str],
    link: &'static str,
}

struct CannedDetail {
    category: &'static str,
    description: &'static str,
    status: DetailStatus,
    source: &'static str,
}

// Each table is ordered by tier: the first entries belong to basic, and a
// deeper tier takes a longer prefix.
static VULNERABILITIES: &[CannedVulnerability] = &[
    CannedVulnerability {
        severity: Severity::Medium,
        title: "Missing Security Headers",
        description: "Your website is missing important security headers like Content-Security-Policy.",
        category: FindingCategory::HttpHeaders,
        source: "Basic Scan",
    },
    CannedVulnerability {
        severity: Severity::High,
        title: "Weak SSL Configuration",
        description: "SSL certificate is using weak cipher suites or outdated protocols.",
        category: FindingCategory::SslTls,
        source: "Advanced Scan",
    },
    CannedVulnerability {
        severity: Severity::Medium,
        title: "Potential Malware Exposure",
        description: "Some resources may contain or link to suspicious content.",
        category: FindingCategory::Malware,
        source: "VirusTotal",
    },
    CannedVulnerability {
        severity: Severity::Critical,
        title: "Content Security Policy Issues",
        description: "Missing or ineffective Content Security Policy detected.",
        category: FindingCategory::ContentSecurity,
        source: "Mozilla Observatory",
    },
    CannedVulnerability {
        severity: Severity::High,
        title: "Insecure Cookie Configuration",
        description: "Cookies are not properly secured with HttpOnly and Secure flags.",
        category: FindingCategory::CookieSecurity,
        source: "Mozilla Observatory",
    },
];

static RECOMMENDATIONS: &[CannedRecommendation] = &[
    CannedRecommendation {
        priority: Severity::High,
        title: "Implement Security Headers",
        description: "Add essential security headers to protect against common attacks.",
        steps: &[
            "Add Content-Security-Policy header",
            "Implement X-Frame-Options: DENY",
            "Set Strict-Transport-Security header",
        ],
        link: "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers",
    },
    CannedRecommendation {
        priority: Severity::High,
        title: "Strengthen SSL Configuration",
        description: "Upgrade your SSL/TLS configuration for better security.",
        steps: &[
            "Disable TLS 1.0 and 1.1",
            "Enable TLS 1.3 if supported",
            "Update cipher suites to strong variants",
            "Implement certificate pinning",
        ],
        link: "https://ssl-config.mozilla.org/",
    },
    CannedRecommendation {
        priority: Severity::Medium,
        title: "Implement Malware Scanning",
        description: "Add regular malware scanning to detect threats.",
        steps: &[
            "Set up automated malware scanning",
            "Monitor for suspicious files",
            "Configure alerts for detected threats",
            "Review third-party scripts regularly",
        ],
        link: "https://www.virustotal.com/",
    },
    CannedRecommendation {
        priority: Severity::Critical,
        title: "Implement Content Security Policy",
        description: "Add a strong Content Security Policy to prevent XSS attacks.",
        steps: &[
            "Create a strict CSP header",
            "Avoid unsafe-inline when possible",
            "Use nonces or hashes for inline scripts",
            "Test CSP in report-only mode first",
        ],
        link: "https://developer.mozilla.org/en-US/docs/Web/HTTP/CSP",
    },
    CannedRecommendation {
        priority: Severity::High,
        title: "Secure Cookie Configuration",
        description: "Improve cookie security to prevent session hijacking.",
        steps: &[
            "Add HttpOnly flag to all cookies",
            "Set Secure flag for HTTPS cookies",
            "Implement SameSite=Strict or Lax",
            "Set appropriate expiration times",
        ],
        link: "https://owasp.org/www-community/controls/SecureCookieAttribute",
    },
];

static DETAILS: &[CannedDetail] = &[
    CannedDetail {
        category: "SSL Certificate",
        description: "Certificate is valid and properly configured",
        status: DetailStatus::Pass,
        source: "SSL Check",
    },
    CannedDetail {
        category: "HTTP Security Headers",
        description: "Missing critical security headers",
        status: DetailStatus::Fail,
        source: "Header Analysis",
    },
    CannedDetail {
        category: "Malware Detection",
        description: "No malware signatures detected",
        status: DetailStatus::Pass,
        source: "VirusTotal",
    },
    CannedDetail {
        category: "Safe Browsing Check",
        description: "Site is not flagged by Google Safe Browsing",
        status: DetailStatus::Pass,
        source: "Google Safe Browsing",
    },
    CannedDetail {
        category: "Content Security Policy",
        description: "CSP implemented but has potential bypass vectors",
        status: DetailStatus::Warning,
        source: "Mozilla Observatory",
    },
    CannedDetail {
        category: "Cookie Security",
        description: "Cookies lack proper security attributes",
        status: DetailStatus::Fail,
        source: "Mozilla Observatory",
    },
];

/// How many canned entries of each table a tier shows:
/// (vulnerabilities, recommendations, details).
fn canned_counts(depth: ScanDepth) -> (usize, usize, usize) {
    match depth {
        ScanDepth::Basic => (1, 1, 2),
        ScanDepth::Advanced => (3, 3, 4),
        ScanDepth::Full => (5, 5, 6),
    }
}

/// Lower bounds applied after the depth adjustment.
pub const ADVANCED_SCORE_FLOOR: u8 = 40;
pub const FULL_SCORE_FLOOR: u8 = 30;

/// Base score in [60, 80) nudged by depth: up to +9 for basic, down by up to
/// 14 (floor 40) for advanced and up to 24 (floor 30) for full.
pub fn fallback_score<R: Rng>(depth: ScanDepth, rng: &mut R) -> u8 {
    let base: u8 = rng.random_range(60..80);
    match depth {
        ScanDepth::Basic => base.saturating_add(rng.random_range(0..10)).min(100),
        ScanDepth::Advanced => base.saturating_sub(rng.random_range(0..15)).max(ADVANCED_SCORE_FLOOR),
        ScanDepth::Full => base.saturating_sub(rng.random_range(0..25)).max(FULL_SCORE_FLOOR),
    }
}

/// Builds a complete synthetic report for `url` at `depth`.
pub fn generate_fallback<R: Rng>(url: &str, depth: ScanDepth, error: Option<String>, rng: &mut R) -> ScanReport {
    let overall_score = fallback_score(depth, rng);
    let (vuln_count, rec_count, detail_count) = canned_counts(depth);
    warn!(url, depth = %depth, score = overall_score, "Generating fallback report.");

    let vulnerabilities = VULNERABILITIES[..vuln_count]
        .iter()
        .map(|v| Vulnerability {
            severity: v.severity,
            title: v.title.to_string(),
            description: v.description.to_string(),
            category: v.category.to_string(),
            source: v.source.to_string(),
        })
        .collect();

    let recommendations = RECOMMENDATIONS[..rec_count]
        .iter()
        .map(|r| Recommendation {
            priority: r.priority,
            title: r.title.to_string(),
            description: r.description.to_string(),
            steps: r.steps.iter().map(|s| s.to_string()).collect(),
            link: Some(r.link.to_string()),
        })
        .collect();

    let details = DETAILS[..detail_count]
        .iter()
        .map(|d| Detail {
            category: d.category.to_string(),
            description: d.description.to_string(),
            status: d.status,
            source: d.source.to_string(),
        })
        .collect();

    ScanReport {
        url: url.to_string(),
        hostname: None,
        timestamp: Utc::now(),
        scan_depth: depth,
        overall_score,
        grade: scoring::score_to_grade(overall_score).to_string(),
        vulnerabilities,
        recommendations,
        details,
        tests_performed: tier::tests_performed(depth),
        scan_duration: tier::scan_duration(depth).to_string(),
        checks: None,
        fallback: true,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    #[test]
    fn scores_stay_within_depth_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let basic = fallback_score(ScanDepth::Basic, &mut rng);
            assert!((60..=89).contains(&basic), "basic {}", basic);

            let advanced = fallback_score(ScanDepth::Advanced, &mut rng);
            assert!((ADVANCED_SCORE_FLOOR..80).contains(&advanced), "advanced {}", advanced);

            let full = fallback_score(ScanDepth::Full, &mut rng);
            assert!((FULL_SCORE_FLOOR..80).contains(&full), "full {}", full);
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = generate_fallback("https://example.com", ScanDepth::Full, None, &mut StdRng::seed_from_u64(42));
        let b = generate_fallback("https://example.com", ScanDepth::Full, None, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.vulnerabilities, b.vulnerabilities);
    }

    #[test]
    fn report_is_self_consistent() {
        let mut rng = StdRng::seed_from_u64(1);
        for depth in ScanDepth::iter() {
            let report = generate_fallback("https://example.com", depth, Some("boom".into()), &mut rng);
            assert!(report.fallback);
            assert_eq!(report.error.as_deref(), Some("boom"));
            assert_eq!(report.grade, scoring::score_to_grade(report.overall_score));
            assert_eq!(report.tests_performed, tier::tests_performed(depth));
            assert!(!report.vulnerabilities.is_empty());
            assert!(!report.recommendations.is_empty());
            assert!(!report.details.is_empty());
        }
    }

    #[test]
    fn canned_content_grows_with_depth() {
        let mut rng = StdRng::seed_from_u64(3);
        let basic = generate_fallback("https://example.com", ScanDepth::Basic, None, &mut rng);
        let advanced = generate_fallback("https://example.com", ScanDepth::Advanced, None, &mut rng);
        let full = generate_fallback("https://example.com", ScanDepth::Full, None, &mut rng);

        assert_eq!(basic.vulnerabilities.len(), 1);
        assert_eq!(advanced.vulnerabilities.len(), 3);
        assert_eq!(full.vulnerabilities.len(), 5);
        assert_eq!(full.details.len(), 6);
        assert!(advanced.vulnerabilities.starts_with(&basic.vulnerabilities));
        assert!(full.recommendations.starts_with(&advanced.recommendations));
        assert_eq!(full.vulnerabilities[3].severity, Severity::Critical);
        assert_eq!(full.vulnerabilities[3].category, "Content Security");
    }
}

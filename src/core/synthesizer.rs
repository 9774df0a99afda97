// src/core/synthesizer.rs

//! Derives vulnerabilities, recommendations and detail rows from the raw
//! check results. Every rule is deterministic and infallible: a well-formed
//! `CheckResultMap` always yields a `Findings` value.

use crate::core::knowledge_base::{
    self, FindingCategory, RemediationGuide, HEADERS_GUIDE, MALWARE_GUIDE, OBSERVATORY_GUIDE,
    SAFE_BROWSING_GUIDE, SSL_GUIDE,
};
use crate::core::models::{
    CheckId, CheckResult, CheckResultMap, Detail, DetailStatus, ObservatoryResult, Recommendation,
    SafeBrowsingResult, ScanDepth, SecurityHeadersResult, Severity, SslLabsResult, VirusTotalResult,
    Vulnerability,
};
use crate::core::tier;
use tracing::debug;

/// Everything the synthesizer derives for one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendations: Vec<Recommendation>,
    pub details: Vec<Detail>,
}

/// Walks the results in tier order, ignoring checks the `depth` tier does
/// not include.
pub fn synthesize(results: &CheckResultMap, depth: ScanDepth) -> Findings {
    let mut findings = Findings::default();

    for result in results.iter().filter(|r| tier::includes(depth, r.check_id())) {
        match result {
            CheckResult::Ssl(ssl) => analyze_ssl(ssl, &mut findings),
            CheckResult::Headers(headers) => analyze_headers(headers, &mut findings),
            CheckResult::VirusTotal(vt) => analyze_virus_total(vt, &mut findings),
            CheckResult::SafeBrowsing(sb) => analyze_safe_browsing(sb, &mut findings),
            CheckResult::Observatory(obs) => analyze_observatory(obs, &mut findings),
        }
    }

    debug!(
        vulnerabilities = findings.vulnerabilities.len(),
        recommendations = findings.recommendations.len(),
        details = findings.details.len(),
        "Findings synthesized."
    );
    findings
}

fn vulnerability(severity: Severity, title: &str, description: String, category: FindingCategory, check: CheckId) -> Vulnerability {
    Vulnerability {
        severity,
        title: title.to_string(),
        description,
        category: category.to_string(),
        source: knowledge_base::source_name(check).to_string(),
    }
}

fn detail(category: &str, description: String, status: DetailStatus, check: CheckId) -> Detail {
    Detail {
        category: category.to_string(),
        description,
        status,
        source: knowledge_base::source_name(check).to_string(),
    }
}

fn recommendation(guide: &RemediationGuide, priority: Severity) -> Recommendation {
    Recommendation {
        priority,
        title: guide.title.to_string(),
        description: guide.description.to_string(),
        steps: guide.steps.iter().map(|s| s.to_string()).collect(),
        link: Some(guide.link.to_string()),
    }
}

/// pass for A/A+, fail for F, warning otherwise (including ERROR).
fn grade_status(grade: &str) -> DetailStatus {
    match grade {
        "A+" | "A" => DetailStatus::Pass,
        "F" => DetailStatus::Fail,
        _ => DetailStatus::Warning,
    }
}

fn analyze_ssl(ssl: &SslLabsResult, findings: &mut Findings) {
    if ssl.has_warnings {
        debug!("SSL Labs reported warnings.");
        findings.vulnerabilities.push(vulnerability(
            Severity::Medium,
            "SSL Configuration Issues",
            "SSL certificate has warnings that should be addressed.".to_string(),
            FindingCategory::SslTls,
            CheckId::Ssl,
        ));
    }

    let poor = match ssl.grade.as_str() {
        "F" => Some((Severity::Critical, "critical")),
        "D" => Some((Severity::High, "significant")),
        "C" => Some((Severity::Medium, "moderate")),
        _ => None,
    };
    if let Some((severity, extent)) = poor {
        debug!(grade = %ssl.grade, "Poor SSL grade.");
        findings.vulnerabilities.push(vulnerability(
            severity,
            "Poor SSL Configuration",
            format!("SSL configuration has {} security issues.", extent),
            FindingCategory::SslTls,
            CheckId::Ssl,
        ));
    }

    if ssl.has_warnings || ssl.grade != "A+" {
        let priority = if ssl.grade == "F" || ssl.grade == "D" { Severity::High } else { Severity::Medium };
        findings.recommendations.push(recommendation(&SSL_GUIDE, priority));
    }

    findings.details.push(detail(
        "SSL Certificate",
        format!("SSL Labs Grade: {}", ssl.grade),
        grade_status(&ssl.grade),
        CheckId::Ssl,
    ));
}

fn analyze_headers(headers: &SecurityHeadersResult, findings: &mut Findings) {
    for header in &headers.missing_headers {
        debug!(header = %header, "Missing security header.");
        findings.vulnerabilities.push(vulnerability(
            knowledge_base::header_severity(header),
            &format!("Missing {}", header),
            format!("The {} security header is not implemented.", header),
            FindingCategory::HttpHeaders,
            CheckId::Headers,
        ));
    }

    if !headers.missing_headers.is_empty() {
        let mut rec = recommendation(&HEADERS_GUIDE, Severity::High);
        rec.steps = headers.missing_headers.iter().map(|h| format!("Implement {}", h)).collect();
        findings.recommendations.push(rec);
    }

    findings.details.push(detail(
        "HTTP Security Headers",
        format!("SecurityHeaders Grade: {}", headers.grade),
        grade_status(&headers.grade),
        CheckId::Headers,
    ));
}

fn analyze_virus_total(vt: &VirusTotalResult, findings: &mut Findings) {
    if !vt.clean {
        debug!(detections = vt.detections, engines = vt.engines, "VirusTotal flagged the site.");
        findings.vulnerabilities.push(vulnerability(
            Severity::Critical,
            "Malware Detection",
            format!("{} out of {} engines detected threats.", vt.detections, vt.engines),
            FindingCategory::Malware,
            CheckId::VirusTotal,
        ));
        findings.recommendations.push(recommendation(&MALWARE_GUIDE, Severity::Critical));
    }

    let (description, status) = if vt.clean {
        ("No threats detected".to_string(), DetailStatus::Pass)
    } else {
        (format!("{} threats found", vt.detections), DetailStatus::Fail)
    };
    findings.details.push(detail("Malware Scan", description, status, CheckId::VirusTotal));
}

fn analyze_safe_browsing(sb: &SafeBrowsingResult, findings: &mut Findings) {
    if !sb.safe {
        debug!(threats = sb.threats.len(), "Safe Browsing flagged the site.");
        findings.vulnerabilities.push(vulnerability(
            Severity::Critical,
            "Safe Browsing Threats",
            "Google Safe Browsing has flagged this site as potentially dangerous.".to_string(),
            FindingCategory::Reputation,
            CheckId::SafeBrowsing,
        ));
        findings.recommendations.push(recommendation(&SAFE_BROWSING_GUIDE, Severity::Critical));
    }

    let status = if sb.safe { DetailStatus::Pass } else { DetailStatus::Fail };
    findings.details.push(detail("Safe Browsing", sb.message.clone(), status, CheckId::SafeBrowsing));
}

fn analyze_observatory(obs: &ObservatoryResult, findings: &mut Findings) {
    if obs.score < 0 {
        let (severity, extent) = if obs.score < -25 { (Severity::High, "significant") } else { (Severity::Medium, "moderate") };
        findings.vulnerabilities.push(vulnerability(
            severity,
            "Poor Mozilla Observatory Score",
            format!("Your site has {} security issues according to Mozilla Observatory.", extent),
            FindingCategory::WebSecurity,
            CheckId::Observatory,
        ));
    }

    if obs.tests_failed > 0 {
        let severity = if obs.tests_failed > 3 { Severity::High } else { Severity::Medium };
        findings.vulnerabilities.push(vulnerability(
            severity,
            "Failed Observatory Tests",
            format!("{} security tests failed in Mozilla Observatory evaluation.", obs.tests_failed),
            FindingCategory::WebSecurity,
            CheckId::Observatory,
        ));
    }

    if obs.score < 50 {
        findings.recommendations.push(recommendation(&OBSERVATORY_GUIDE, Severity::Medium));
    }

    let score_status = match obs.score {
        s if s >= 50 => DetailStatus::Pass,
        s if s >= 0 => DetailStatus::Warning,
        _ => DetailStatus::Fail,
    };
    findings.details.push(detail(
        "Mozilla Observatory",
        format!("Score: {}, Grade: {}", obs.score, obs.grade),
        score_status,
        CheckId::Observatory,
    ));

    let tests_status = match obs.tests_failed {
        0 => DetailStatus::Pass,
        1..=3 => DetailStatus::Warning,
        _ => DetailStatus::Fail,
    };
    findings.details.push(detail(
        "Observatory Tests",
        format!("Passed: {}, Failed: {}", obs.tests_passed, obs.tests_failed),
        tests_status,
        CheckId::Observatory,
    ));
}

// src/core/scoring.rs

//! Weighted aggregation of check results into a 0-100 score and letter grade.

use crate::core::models::{CheckId, CheckResult, CheckResultMap, ScanDepth};
use crate::core::tier;
use tracing::debug;

/// Nominal weight of each check. The score is normalised over the weights of
/// the checks actually present, so these need not sum to one for a tier.
pub fn weight(check: CheckId) -> f64 {
    match check {
        CheckId::Ssl => 0.30,
        CheckId::Headers => 0.30,
        CheckId::VirusTotal => 0.15,
        CheckId::SafeBrowsing => 0.15,
        CheckId::Observatory => 0.20,
    }
}

/// Letter grade to numeric input, used for SSL Labs and SecurityHeaders grades.
static GRADE_SCORES: &[(&str, u32)] = &[
    ("A+", 100),
    ("A", 95),
    ("A-", 90),
    ("B+", 85),
    ("B", 80),
    ("B-", 75),
    ("C+", 70),
    ("C", 65),
    ("C-", 60),
    ("D+", 55),
    ("D", 50),
    ("D-", 45),
    ("F", 25),
    ("ERROR", 0),
    ("N/A", 50),
];

/// Score to letter grade, highest threshold first.
static GRADE_THRESHOLDS: &[(u8, &str)] = &[
    (97, "A+"),
    (93, "A"),
    (90, "A-"),
    (87, "B+"),
    (83, "B"),
    (80, "B-"),
    (77, "C+"),
    (73, "C"),
    (70, "C-"),
    (67, "D+"),
    (63, "D"),
    (60, "D-"),
];

/// Unknown grades (including "PENDING") score 0.
pub fn grade_to_score(grade: &str) -> u32 {
    GRADE_SCORES
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, s)| *s)
        .unwrap_or(0)
}

pub fn score_to_grade(score: u8) -> &'static str {
    GRADE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or("F")
}

/// Raw 0-100 contribution of a single result, before weighting.
pub fn raw_score(result: &CheckResult) -> f64 {
    match result {
        CheckResult::Ssl(ssl) => grade_to_score(&ssl.grade) as f64,
        CheckResult::Headers(headers) => grade_to_score(&headers.grade) as f64,
        CheckResult::VirusTotal(vt) => {
            if vt.clean {
                100.0
            } else {
                (100.0 - vt.detections as f64 * 10.0).max(0.0)
            }
        }
        CheckResult::SafeBrowsing(sb) => {
            if sb.safe {
                100.0
            } else {
                0.0
            }
        }
        CheckResult::Observatory(obs) => (obs.score as f64 + 100.0).max(0.0),
    }
}

/// Weighted average over the checks present in `results` that belong to the
/// `depth` tier; 0 when there are none.
pub fn score(results: &CheckResultMap, depth: ScanDepth) -> u8 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for result in results.iter().filter(|r| tier::includes(depth, r.check_id())) {
        let w = weight(result.check_id());
        let raw = raw_score(result);
        debug!(check = %result.check_id(), raw, weight = w, "Scoring check.");
        total_score += raw * w;
        total_weight += w;
    }

    if total_weight <= 0.0 {
        return 0;
    }
    (total_score / total_weight).round().clamp(0.0, 100.0) as u8
}

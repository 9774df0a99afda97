// src/core/tier.rs

//! Maps a scan depth to the checks it runs and the labels shown for it.

use crate::core::error::ScanError;
use crate::core::models::{CheckId, ScanDepth};
use std::str::FromStr;

const BASIC_CHECKS: &[CheckId] = &[CheckId::Ssl, CheckId::Headers];
const ADVANCED_CHECKS: &[CheckId] = &[CheckId::Ssl, CheckId::Headers, CheckId::VirusTotal, CheckId::SafeBrowsing];
const FULL_CHECKS: &[CheckId] = &[
    CheckId::Ssl,
    CheckId::Headers,
    CheckId::VirusTotal,
    CheckId::SafeBrowsing,
    CheckId::Observatory,
];

/// Returns the checks to run for `depth`, in execution and report order.
pub fn select_checks(depth: ScanDepth) -> &'static [CheckId] {
    match depth {
        ScanDepth::Basic => BASIC_CHECKS,
        ScanDepth::Advanced => ADVANCED_CHECKS,
        ScanDepth::Full => FULL_CHECKS,
    }
}

/// Whether `check` belongs to the tier selected by `depth`.
pub fn includes(depth: ScanDepth, check: CheckId) -> bool {
    select_checks(depth).contains(&check)
}

/// Parses a depth identifier. Unknown values are an error, never a default.
pub fn parse_depth(value: &str) -> Result<ScanDepth, ScanError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "basic" => Ok(ScanDepth::Basic),
        "advanced" => Ok(ScanDepth::Advanced),
        "full" => Ok(ScanDepth::Full),
        _ => Err(ScanError::InvalidConfiguration(format!(
            "unknown scan depth '{}' (expected basic, advanced or full)",
            value
        ))),
    }
}

impl FromStr for ScanDepth {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_depth(s)
    }
}

/// Human-readable name of a check as listed under "tests performed".
pub fn test_name(check: CheckId) -> &'static str {
    match check {
        CheckId::Ssl => "SSL Certificate Analysis",
        CheckId::Headers => "Security Headers Check",
        CheckId::VirusTotal => "Malware Detection (VirusTotal)",
        CheckId::SafeBrowsing => "Google Safe Browsing Check",
        CheckId::Observatory => "Mozilla Observatory Comprehensive Analysis",
    }
}

pub fn tests_performed(depth: ScanDepth) -> Vec<String> {
    select_checks(depth).iter().map(|c| test_name(*c).to_string()).collect()
}

/// Reported scan duration.
pub fn scan_duration(depth: ScanDepth) -> &'static str {
    match depth {
        ScanDepth::Basic => "28 seconds",
        ScanDepth::Advanced => "57 seconds",
        ScanDepth::Full => "86 seconds",
    }
}

/// Duration estimate shown before the scan starts.
pub fn duration_estimate(depth: ScanDepth) -> &'static str {
    match depth {
        ScanDepth::Basic => "~30 seconds",
        ScanDepth::Advanced => "~60 seconds",
        ScanDepth::Full => "~90 seconds",
    }
}

pub fn description(depth: ScanDepth) -> &'static str {
    match depth {
        ScanDepth::Basic => "SSL & Security Headers only",
        ScanDepth::Advanced => "Adds VirusTotal & Safe Browsing",
        ScanDepth::Full => "Adds Mozilla Observatory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn tiers_form_a_superset_chain() {
        let basic = select_checks(ScanDepth::Basic);
        let advanced = select_checks(ScanDepth::Advanced);
        let full = select_checks(ScanDepth::Full);

        assert!(basic.iter().all(|c| advanced.contains(c)));
        assert!(advanced.iter().all(|c| full.contains(c)));
        assert_eq!(full.len(), 5);
    }

    #[test]
    fn basic_runs_ssl_and_headers_only() {
        assert_eq!(select_checks(ScanDepth::Basic), &[CheckId::Ssl, CheckId::Headers]);
        assert!(!includes(ScanDepth::Advanced, CheckId::Observatory));
        assert!(includes(ScanDepth::Full, CheckId::Observatory));
    }

    #[test]
    fn tests_performed_follow_selection_order() {
        assert_eq!(
            tests_performed(ScanDepth::Basic),
            vec!["SSL Certificate Analysis", "Security Headers Check"]
        );
        for depth in ScanDepth::iter() {
            assert_eq!(tests_performed(depth).len(), select_checks(depth).len());
        }
    }

    #[test]
    fn unknown_depth_is_rejected() {
        assert_eq!(parse_depth("Full").unwrap(), ScanDepth::Full);
        assert_eq!(" advanced ".parse::<ScanDepth>().unwrap(), ScanDepth::Advanced);

        match parse_depth("deep") {
            Err(ScanError::InvalidConfiguration(msg)) => assert!(msg.contains("deep")),
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }
}

// src/core/mod.rs

// Root of the `core` module: everything needed to turn a URL and a depth
// into a `ScanReport`, independent of the terminal UI.

/// Data structures shared across the crate, such as `ScanReport`,
/// `CheckResult` and the per-check result records.
pub mod models;

pub mod error;

/// Which checks run at each depth, and how the tiers are described.
pub mod tier;

pub mod target;

/// Weighted scoring of check results and the grade tables.
pub mod scoring;

/// Static knowledge used when turning results into findings: header
/// criticality, source names and remediation guides.
pub mod knowledge_base;

/// Turns check results into vulnerabilities, recommendations and details.
pub mod synthesizer;

/// Synthetic reports used when the real pipeline fails.
pub mod fallback;

/// Provider clients, the concurrent orchestrator and the `Scanner` pipeline.
pub mod scanner;

/// JSON export of finished reports.
pub mod report;

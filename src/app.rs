// src/app.rs

use ratatui::widgets::ListState;
use webguard_scanner::core::models::{
    Detail, DetailStatus, Recommendation, ScanDepth, ScanReport, Severity, Vulnerability,
};
use webguard_scanner::core::tier;

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub score: u8,
    pub grade: String,
    pub critical_issues: usize,
    pub high_issues: usize,
    pub medium_issues: usize,
    pub low_issues: usize,
    pub tests_performed: Vec<String>,
    pub scan_duration: String,
    pub fallback: bool,
}

/// One row of the findings list.
pub enum FindingItem {
    Vulnerability(Vulnerability),
    Recommendation(Recommendation),
    Detail(Detail),
}

impl FindingItem {
    pub fn title(&self) -> String {
        match self {
            FindingItem::Vulnerability(v) => v.title.clone(),
            FindingItem::Recommendation(r) => r.title.clone(),
            FindingItem::Detail(d) => format!("{}: {}", d.category, d.description),
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub input_error: Option<String>,
    pub depth: ScanDepth,
    pub scan_report: Option<ScanReport>,
    pub summary: ScanSummary,
    pub findings: Vec<FindingItem>,
    pub analysis_list_state: ListState,
    pub spinner_frame: usize,
    pub displayed_score: u8,
    pub export_status: ExportStatus,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            input_error: None,
            depth: ScanDepth::Basic,
            scan_report: None,
            summary: ScanSummary::default(),
            findings: Vec::new(),
            analysis_list_state: ListState::default(),
            spinner_frame: 0,
            displayed_score: 0,
            export_status: ExportStatus::Idle,
        }
    }

    /// basic -> advanced -> full -> basic
    pub fn cycle_depth(&mut self) {
        self.depth = match self.depth {
            ScanDepth::Basic => ScanDepth::Advanced,
            ScanDepth::Advanced => ScanDepth::Full,
            ScanDepth::Full => ScanDepth::Basic,
        };
    }

    pub fn depth_label(&self) -> String {
        format!("{} ({})", self.depth, tier::duration_estimate(self.depth))
    }

    pub fn start_scan(&mut self) {
        self.input_error = None;
        self.state = AppState::Scanning;
        self.spinner_frame = 0;
    }

    pub fn set_report(&mut self, report: ScanReport) {
        self.summary = ScanSummary {
            score: report.overall_score,
            grade: report.grade.clone(),
            critical_issues: report.count_by_severity(Severity::Critical),
            high_issues: report.count_by_severity(Severity::High),
            medium_issues: report.count_by_severity(Severity::Medium),
            low_issues: report.count_by_severity(Severity::Low),
            tests_performed: report.tests_performed.clone(),
            scan_duration: report.scan_duration.clone(),
            fallback: report.fallback,
        };

        self.findings = report
            .vulnerabilities
            .iter()
            .cloned()
            .map(FindingItem::Vulnerability)
            .chain(report.recommendations.iter().cloned().map(FindingItem::Recommendation))
            .chain(report.details.iter().cloned().map(FindingItem::Detail))
            .collect();

        self.analysis_list_state = ListState::default();
        if !self.findings.is_empty() {
            self.analysis_list_state.select(Some(0));
        }
        self.displayed_score = 0;
        self.scan_report = Some(report);
        self.state = AppState::Finished;
    }

    /// A scan that never produced a report returns to the input box.
    pub fn set_scan_error(&mut self, message: String) {
        self.state = AppState::Idle;
        self.input_error = Some(message);
    }

    pub fn selected_finding(&self) -> Option<&FindingItem> {
        self.analysis_list_state.selected().and_then(|i| self.findings.get(i))
    }

    pub fn scroll_up(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let i = self.analysis_list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.analysis_list_state.select(Some(i));
    }

    pub fn scroll_down(&mut self) {
        if self.findings.is_empty() {
            return;
        }
        let last = self.findings.len() - 1;
        let i = self.analysis_list_state.selected().map_or(0, |i| (i + 1).min(last));
        self.analysis_list_state.select(Some(i));
    }

    /// Advances the spinner and animates the gauge towards the final score.
    pub fn on_tick(&mut self) {
        match self.state {
            AppState::Scanning => self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len(),
            AppState::Finished if self.displayed_score < self.summary.score => {
                self.displayed_score = (self.displayed_score + 4).min(self.summary.score);
            }
            _ => {}
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Back to the input box, keeping the chosen depth.
    pub fn reset(&mut self) {
        let depth = self.depth;
        *self = Self::new();
        self.depth = depth;
    }
}

pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::High => "HIGH",
        Severity::Medium => "MEDIUM",
        Severity::Low => "LOW",
    }
}

pub fn status_label(status: DetailStatus) -> &'static str {
    match status {
        DetailStatus::Pass => "PASS",
        DetailStatus::Warning => "WARN",
        DetailStatus::Fail => "FAIL",
    }
}

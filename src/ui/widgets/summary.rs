// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

/// Renders the summary widget: score and grade, an animated gauge, issue
/// counts by severity and the tests that were run. Empty until a scan has
/// finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & Grade
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Issues Found
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Tests Performed
        ])
        .split(area);

    if !matches!(app.state, AppState::Finished) {
        return;
    }

    let grade_style = match app.summary.score {
        80..=100 => Style::default().fg(Color::Green),
        60..=79 => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };
    let score_text = Text::from(vec![
        Line::from("Overall Score".bold()),
        Line::from(format!("{}/100  Grade {}", app.summary.score, app.summary.grade)).style(grade_style),
        Line::from(format!("Duration: {}", app.summary.scan_duration).dark_gray()),
    ]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    let score_gauge = Gauge::default()
        .percent(app.displayed_score as u16)
        .label("")
        .style(grade_style);
    frame.render_widget(score_gauge, summary_chunks[1]);

    let counts = [
        ("Critical: ", app.summary.critical_issues, Color::Red),
        ("High:     ", app.summary.high_issues, Color::LightRed),
        ("Medium:   ", app.summary.medium_issues, Color::Yellow),
        ("Low:      ", app.summary.low_issues, Color::Cyan),
    ];
    let issue_lines: Vec<Line> = counts
        .into_iter()
        .map(|(label, count, color)| {
            Line::from(vec![Span::raw(label), Span::styled(count.to_string(), Style::default().fg(color))])
        })
        .collect();
    let issues_block = Block::default().title("ISSUES FOUND".bold());
    frame.render_widget(Paragraph::new(issue_lines).block(issues_block), summary_chunks[3]);

    let tests_block = Block::default().title("TESTS PERFORMED".bold());
    let tests_lines: Vec<Line> = app
        .summary
        .tests_performed
        .iter()
        .map(|name| Line::from(vec![Span::styled("✓ ", Style::default().fg(Color::Green)), Span::raw(name.as_str())]))
        .collect();
    frame.render_widget(Paragraph::new(tests_lines).wrap(Wrap { trim: true }).block(tests_block), summary_chunks[5]);
}

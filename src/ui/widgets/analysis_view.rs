// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, FindingItem, SPINNER_CHARS, severity_label, status_label};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use webguard_scanner::core::models::{DetailStatus, Severity};
use webguard_scanner::core::tier;

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::High => Style::default().fg(Color::Red),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Cyan),
    }
}

fn status_style(status: DetailStatus) -> Style {
    match status {
        DetailStatus::Pass => Style::default().fg(Color::Green),
        DetailStatus::Warning => Style::default().fg(Color::Yellow),
        DetailStatus::Fail => Style::default().fg(Color::Red),
    }
}

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default().borders(Borders::ALL).title("Analysis Report (Navigate with ↑ ↓)");

    if !matches!(app.state, AppState::Finished) {
        let content = match app.state {
            AppState::Idle => Paragraph::new(vec![
                Line::from("Scan results will appear here..."),
                Line::from(""),
                Line::from(tier::description(app.depth).dark_gray()),
            ])
            .alignment(Alignment::Center),
            AppState::Scanning => Paragraph::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("Running {} scan... Please wait.", app.depth)),
                ]),
                Line::from(format!("Estimated time: {}", tier::duration_estimate(app.depth)).dark_gray()),
            ])
            .alignment(Alignment::Center),
            AppState::Finished => Paragraph::new(""),
        };
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let mut constraints = vec![Constraint::Percentage(45), Constraint::Min(0)];
    if app.summary.fallback {
        constraints.insert(0, Constraint::Length(2));
    }
    let chunks = Layout::default().direction(Direction::Vertical).constraints(constraints).split(inner_area);
    let (list_area, detail_area) = if app.summary.fallback {
        render_fallback_banner(frame, app, chunks[0]);
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    let items: Vec<ListItem> = app
        .findings
        .iter()
        .map(|item| {
            let (tag, style) = match item {
                FindingItem::Vulnerability(v) => (format!("[{}] ", severity_label(v.severity)), severity_style(v.severity)),
                FindingItem::Recommendation(r) => ("[FIX] ".to_string(), severity_style(r.priority)),
                FindingItem::Detail(d) => (format!("[{}] ", status_label(d.status)), status_style(d.status)),
            };
            ListItem::new(Line::from(vec![Span::styled(tag, style), Span::raw(item.title())]))
        })
        .collect();

    let findings_list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, list_area, &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    match app.selected_finding() {
        Some(item) => {
            let p = Paragraph::new(detail_text(item)).wrap(Wrap { trim: true }).block(detail_block);
            frame.render_widget(p, detail_area);
        }
        None => render_placeholder_details(frame, detail_block, detail_area),
    }
}

fn detail_text(item: &FindingItem) -> Vec<Line<'_>> {
    match item {
        FindingItem::Vulnerability(v) => vec![
            Line::from(""),
            Line::from(vec!["WHAT IT IS: ".yellow().bold(), Span::raw(v.category.as_str())]),
            Line::from(v.description.as_str()),
            Line::from(""),
            Line::from(format!("Reported by {}", v.source).dark_gray()),
        ],
        FindingItem::Recommendation(r) => {
            let mut lines = vec![Line::from(""), Line::from(r.description.as_str()), Line::from("")];
            if !r.steps.is_empty() {
                lines.push(Line::from("HOW TO FIX:".yellow().bold()));
                lines.extend(r.steps.iter().enumerate().map(|(i, step)| Line::from(format!("{}. {}", i + 1, step))));
            }
            if let Some(link) = &r.link {
                lines.push(Line::from(""));
                lines.push(Line::from(link.as_str().cyan()));
            }
            lines
        }
        FindingItem::Detail(d) => vec![
            Line::from(""),
            Line::from(vec![Span::styled(status_label(d.status), status_style(d.status)), Span::raw(format!("  {}", d.category))]),
            Line::from(d.description.as_str()),
            Line::from(""),
            Line::from(format!("Source: {}", d.source).dark_gray()),
        ],
    }
}

fn render_fallback_banner(frame: &mut Frame, app: &App, area: Rect) {
    let reason = app.scan_report.as_ref().and_then(|r| r.error.as_deref()).unwrap_or("external services unavailable");
    let banner = Paragraph::new(vec![
        Line::from("⚠ Estimated results: the live checks could not be completed.".yellow().bold()),
        Line::from(reason.dark_gray()),
    ]);
    frame.render_widget(banner, area);
}

fn render_placeholder_details(frame: &mut Frame, block: Block, area: Rect) {
    let placeholder_text = Text::from(vec![
        Line::from(""),
        Line::from("✓ NOTHING TO REPORT".bold().fg(Color::Green)),
        Line::from(""),
        Line::from("No findings were produced for this scan."),
    ]);
    let p = Paragraph::new(placeholder_text).alignment(Alignment::Center).block(block);
    frame.render_widget(p, area);
}

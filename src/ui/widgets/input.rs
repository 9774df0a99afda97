// src/ui/widgets/input.rs
use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the URL input box. The second line shows the selected depth, or
/// the validation error of the last attempt.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_block = Block::default().borders(Borders::ALL).title("Target URL");

    let status_line = match &app.input_error {
        Some(error) => Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
        None => Line::from(vec![
            Span::styled("Depth: ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.depth_label(), Style::default().fg(Color::Cyan)),
            Span::styled("  (Tab to change)", Style::default().fg(Color::DarkGray)),
        ]),
    };

    let input_paragraph = Paragraph::new(vec![
        Line::from(Span::styled(app.input.as_str(), Style::default().fg(Color::Yellow))),
        status_line,
    ])
    .block(input_block);
    frame.render_widget(input_paragraph, area);

    if let AppState::Idle = app.state {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}

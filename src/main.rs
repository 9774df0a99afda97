// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use webguard_scanner::core::models::ScanReport;
use webguard_scanner::core::report::export_to_dir;
use webguard_scanner::core::target::{parse_target, with_default_scheme};
use webguard_scanner::{ScanError, Scanner, ScannerConfig, logging};

mod app;
mod ui;

use app::{App, AppState, ExportStatus};

type ScanOutcome = std::result::Result<ScanReport, ScanError>;

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize_logging()?;
    install_hooks()?;

    let config = ScannerConfig::load()?;
    let scanner = Arc::new(Scanner::new(config)?);
    info!("Scanner ready.");

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &scanner, &tx)?;
        }

        if let Ok(outcome) = rx.try_recv() {
            match outcome {
                Ok(report) => app.set_report(report),
                Err(e) => app.set_scan_error(e.to_string()),
            }
        }
        app.on_tick();
    }

    restore_terminal()?;
    Ok(())
}

fn restore_terminal() -> std::io::Result<()> {
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()
}

/// Installs color-eyre's hooks. Every panic is logged; only a panic on the
/// UI thread restores the terminal and prints the report.
fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        error!(thread = thread.name().unwrap_or("unnamed"), panic = %info, "Panic.");
        if panic_escapes_to_terminal(thread.name()) {
            let _ = restore_terminal();
            eprintln!("{}", panic_hook.panic_report(info));
        }
    }));
    Ok(())
}

/// Panics in scan tasks run on runtime worker threads and are absorbed by
/// the orchestrator, so the TUI keeps the screen.
fn panic_escapes_to_terminal(thread_name: Option<&str>) -> bool {
    thread_name == Some("main")
}

fn handle_events(app: &mut App, scanner: &Arc<Scanner>, tx: &mpsc::Sender<ScanOutcome>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Idle => handle_idle_input(app, key.code, scanner, tx),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => {
                    if key.code == KeyCode::Char('q') {
                        app.quit();
                    }
                }
            }
        }
    }
    Ok(())
}

/// Typing state. `q` is a valid URL character here, so quitting is on Esc.
fn handle_idle_input(app: &mut App, key_code: KeyCode, scanner: &Arc<Scanner>, tx: &mpsc::Sender<ScanOutcome>) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.cycle_depth(),
        KeyCode::Char(c) => {
            app.input.push(c);
            app.input_error = None;
        }
        KeyCode::Backspace => {
            app.input.pop();
            app.input_error = None;
        }
        KeyCode::Enter => {
            if app.input.trim().is_empty() {
                return;
            }
            let url = with_default_scheme(&app.input);
            if let Err(e) = parse_target(&url) {
                app.input_error = Some(e.to_string());
                return;
            }

            app.start_scan();
            let depth = app.depth;
            let scanner = Arc::clone(scanner);
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = scanner.scan(&url, depth).await;
                let _ = tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => export_report(app),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}

/// Writes the report to the working directory.
fn export_report(app: &mut App) {
    let Some(report) = &app.scan_report else {
        return;
    };
    let dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    app.export_status = match export_to_dir(report, &dir) {
        Ok(path) => ExportStatus::Success(path.display().to_string()),
        Err(e) => {
            error!(error = %e, "Report export failed.");
            ExportStatus::Error(e.to_string())
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ui_thread_panics_reach_the_terminal() {
        assert!(panic_escapes_to_terminal(Some("main")));
        assert!(!panic_escapes_to_terminal(Some("tokio-runtime-worker")));
        assert!(!panic_escapes_to_terminal(None));
    }
}

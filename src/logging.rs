// src/logging.rs

use color_eyre::eyre::Result;
use lazy_static::lazy_static;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::get_data_dir;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Filter directive from `RUST_LOG`, then `WEBGUARD_SCANNER_LOGLEVEL`, then
/// `webguard_scanner=info`.
fn log_filter<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("RUST_LOG")
        .or_else(|| lookup(LOG_ENV.as_str()))
        .unwrap_or_else(|| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// Initializes file-based logging in the data dir. The TUI owns the
/// terminal, so nothing is written to stdout.
pub fn initialize_logging() -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(LOG_FILE.clone());
    let log_file = std::fs::File::create(log_path)?;

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(log_filter(|name| std::env::var(name).ok())));

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_follow_crate_name() {
        assert_eq!(LOG_ENV.as_str(), "WEBGUARD_SCANNER_LOGLEVEL");
        assert_eq!(LOG_FILE.as_str(), "webguard-scanner.log");
    }

    #[test]
    fn filter_prefers_rust_log_then_project_variable() {
        assert_eq!(log_filter(|_| None), "webguard_scanner=info");
        assert_eq!(
            log_filter(|name| (name == "WEBGUARD_SCANNER_LOGLEVEL").then(|| "debug".to_string())),
            "debug"
        );
        assert_eq!(log_filter(|_| Some("trace".to_string())), "trace");
    }
}

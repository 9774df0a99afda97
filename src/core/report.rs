// src/core/report.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::models::ScanReport;

/// Pretty-printed JSON of `report` with an added `exportDate`.
pub fn export_json(report: &ScanReport, exported_at: DateTime<Utc>) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(report)?;
    if let Value::Object(map) = &mut value {
        map.insert("exportDate".to_string(), Value::String(exported_at.to_rfc3339()));
    }
    serde_json::to_string_pretty(&value)
}

pub fn export_file_name(exported_at: DateTime<Utc>) -> String {
    format!("security-report-{}.json", exported_at.format("%Y-%m-%d"))
}

/// Writes the export into `dir` and returns the path of the new file.
pub fn export_to_dir(report: &ScanReport, dir: &Path) -> io::Result<PathBuf> {
    let now = Utc::now();
    let json = export_json(report, now)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now));
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "Report exported.");
    Ok(path)
}

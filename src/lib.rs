// src/lib.rs

//! Website security scanner: runs external security checks against a URL
//! at a chosen depth and condenses them into a scored, graded report.

pub mod config;
pub mod core;
pub mod logging;

pub use crate::config::ScannerConfig;
pub use crate::core::error::ScanError;
pub use crate::core::models::{ScanDepth, ScanReport};
pub use crate::core::scanner::Scanner;

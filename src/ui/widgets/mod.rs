// src/ui/widgets/mod.rs

pub mod analysis_view; // Findings list and detail pane.
pub mod footer; // Key hints for the current state.
pub mod input; // URL input with depth selector.
pub mod summary; // Score gauge, grade and issue counts.

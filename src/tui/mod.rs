//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Dashboard with service status
//! - Single-patient risk prediction
//! - Batch prediction from CSV with export
//! - Model metadata, metrics and reload

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{Completion, RequestWorker};

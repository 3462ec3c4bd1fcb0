//! Adapters layer: concrete implementations of ports and I/O formats.
//!
//! - `http`: `reqwest` client for the prediction service
//! - `csv`: patient-file ingestion and result export
//! - `sanitize`: redaction for log output

pub mod csv;
pub mod http;
pub mod sanitize;

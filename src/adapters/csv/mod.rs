//! CSV adapter: patient-file ingestion and result export.

pub mod export;
pub mod ingest;

pub use export::{export_to_dir, to_csv_bytes, EXPORT_FILE_NAME};
pub use ingest::{parse_file, parse_reader, CsvIngest, ParseError, RowError};

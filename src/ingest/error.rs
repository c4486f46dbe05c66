use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to read csv headers from {path}: {source}")]
    Header { path: String, source: csv::Error },
}

/// A single malformed row, kept alongside its values so a caller can report
/// it without aborting the whole load -- `load_fuel_stations` keeps going
/// past bad rows and prints a summary at the end rather than failing outright.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line_number: u64,
    pub message: String,
}

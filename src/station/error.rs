use thiserror::Error;

#[derive(Error, Debug)]
pub enum StationError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("station {0} not found")]
    NotFound(i64),
}

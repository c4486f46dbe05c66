use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no geocoding results for query {0:?}")]
    NoResults(String),
    #[error("geocoding result for query {query:?} had an unparseable coordinate: {value:?}")]
    MalformedCoordinate { query: String, value: String },
}

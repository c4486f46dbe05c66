use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service returned no route")]
    NoRoute,
}

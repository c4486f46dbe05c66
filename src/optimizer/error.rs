use thiserror::Error;

/// Error kinds surfaced by the core. These `Display` strings are serialized
/// straight into the `{ "error": .. }` response envelope, so their wording
/// is load-bearing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Route has fewer than 2 vertices or a non-positive total distance")]
    EmptyRoute,
    #[error("No fuel stations found along route, cannot complete trip")]
    NoStationsOnRoute,
    #[error("Stranded at mile {0:.1}. No stations in range.")]
    Stranded(f64),
}

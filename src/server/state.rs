use std::sync::RwLock;

use crate::config::{GeocodingConfig, OptimizerConfig, RoutingConfig};
use crate::geocoding::NominatimClient;
use crate::routing::OsrmClient;
use crate::station::InMemoryStationIndex;

/// Shared application state, injected into every handler via `web::Data`.
/// The station index sits behind a `RwLock` because an out-of-band
/// geocoding run swaps it for a freshly built one rather than mutating
/// stations in place.
pub struct AppState {
    pub station_index: RwLock<InMemoryStationIndex>,
    pub optimizer_config: OptimizerConfig,
    pub geocoding_client: NominatimClient,
    pub routing_client: OsrmClient,
}

impl AppState {
    pub fn new(station_index: InMemoryStationIndex) -> Self {
        AppState {
            station_index: RwLock::new(station_index),
            optimizer_config: OptimizerConfig::from_env(),
            geocoding_client: NominatimClient::new(&GeocodingConfig::from_env()),
            routing_client: OsrmClient::new(&RoutingConfig::from_env()),
        }
    }

    pub fn replace_station_index(&self, index: InMemoryStationIndex) {
        let mut guard = self.station_index.write().expect("station index lock poisoned");
        *guard = index;
    }
}

//! Turn-by-turn geometry lookups against an OSRM server. Mirrors the shape of
//! `jelmer-valhalla-client-rs`'s route client -- a thin typed wrapper around
//! one HTTP endpoint -- cut down to the single field the optimizer core
//! actually consumes.

pub mod error;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

pub use error::RoutingError;
use crate::config::RoutingConfig;
use crate::optimizer::Polyline;

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// The two fields the optimizer core needs out of an OSRM route: its
/// polyline and its total distance, independent of the polyline's own arc
/// length.
pub struct RouteGeometry {
    pub polyline: Polyline,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

pub struct OsrmClient {
    client: Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(config: &RoutingConfig) -> Self {
        OsrmClient {
            client: Client::builder()
                .user_agent("fuel-route-optimizer/0.1")
                .build()
                .expect("reqwest client builder"),
            base_url: config.osrm_base_url.clone(),
        }
    }

    /// Fetches the best driving route between two (latitude, longitude)
    /// points.
    pub fn route(&self, start: (f64, f64), end: (f64, f64)) -> Result<RouteGeometry, RoutingError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, start.1, start.0, end.1, end.0
        );
        debug!("requesting route {url}");

        let response: OsrmResponse = self
            .client
            .get(&url)
            .query(&[("geometries", "geojson"), ("overview", "full"), ("steps", "true")])
            .send()?
            .error_for_status()?
            .json()?;

        let route = response.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;

        Ok(RouteGeometry {
            polyline: Polyline::from_geojson_coordinates(&route.geometry.coordinates),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

//! The trip-planning core: given a route polyline and a station corpus,
//! produce the cheapest sequence of refueling stops. Grounded in
//! `layers::road_network::RoadNetwork`'s "struct wraps a spatial index, plain
//! functions do the math" shape, with the domain logic itself ported from
//! `optimizer/services/optimization_service.py`'s `find_optimal_stops`.

pub mod arc_length;
pub mod corridor;
pub mod error;
pub mod projector;
pub mod selector;

use crate::config::OptimizerConfig;
use crate::station::StationIndex;

pub use error::OptimizerError;

const METERS_PER_MILE: f64 = 1609.344;

/// An ordered route polyline in (latitude, longitude) degrees.
#[derive(Debug, Clone)]
pub struct Polyline {
    pub vertices: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Polyline { vertices }
    }

    /// Routing collaborators hand back GeoJSON-shaped `[lon, lat]` pairs;
    /// this is the one place that flips them to the (lat, lon) order the
    /// rest of the core uses.
    pub fn from_geojson_coordinates(coordinates: &[[f64; 2]]) -> Self {
        Polyline {
            vertices: coordinates.iter().map(|c| (c[1], c[0])).collect(),
        }
    }

    /// Inverse of [`Polyline::from_geojson_coordinates`], for echoing the
    /// route geometry back in a response body.
    pub fn to_geojson_coordinates(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().map(|&(lat, lon)| [lon, lat]).collect()
    }
}

/// A single planned refuel, ready to serialize into the response body. Field
/// names on the wire (`station`/`price`/`lat`/`lon`) match the
/// `FuelStopSerializer` fields the API contract was distilled from.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Stop {
    #[serde(rename = "station")]
    pub station_name: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "price")]
    pub price_formatted: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub refill_gallons: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OptimizeResult {
    pub stops: Vec<Stop>,
    pub total_cost: f64,
    pub fuel_consumed_gallons: f64,
}

pub struct Optimizer<'a> {
    config: &'a OptimizerConfig,
}

impl<'a> Optimizer<'a> {
    pub fn new(config: &'a OptimizerConfig) -> Self {
        Optimizer { config }
    }

    /// Runs the full pipeline: corridor filter, projection, greedy
    /// selection. `total_distance_meters` is the routing collaborator's
    /// reported trip length, independent of the polyline's own arc length
    /// (the two may diverge slightly; the route's reported distance wins).
    pub fn optimize(
        &self,
        polyline: &Polyline,
        total_distance_meters: f64,
        station_index: &dyn StationIndex,
    ) -> Result<OptimizeResult, OptimizerError> {
        if polyline.vertices.len() < 2 || total_distance_meters <= 0.0 {
            return Err(OptimizerError::EmptyRoute);
        }

        let total_distance_miles = total_distance_meters / METERS_PER_MILE;
        let arc_lengths = arc_length::ArcLengthTable::build(&polyline.vertices);

        let corridor_stations = corridor::filter_corridor(
            &polyline.vertices,
            station_index,
            self.config.search_corridor_miles,
        );

        if corridor_stations.is_empty() && total_distance_miles > self.config.tank_range_miles {
            return Err(OptimizerError::NoStationsOnRoute);
        }

        let projected = projector::project_stations(&corridor_stations, &polyline.vertices, &arc_lengths);

        selector::select_stops(&projected, total_distance_miles, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Station;
    use std::f64::consts::PI;
    use std::sync::Arc;

    const EARTH_RADIUS_MILES: f64 = 3959.0;

    struct TestIndex(Vec<Station>);

    impl StationIndex for TestIndex {
        fn query_bbox(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Vec<Arc<Station>> {
            self.0
                .iter()
                .filter(|s| s.geocoded())
                .filter(|s| {
                    let (lat, lon) = s.coordinates().unwrap();
                    lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
                })
                .cloned()
                .map(Arc::new)
                .collect()
        }
    }

    fn station(id: i64, lat: f64, lon: f64, price: f64) -> Station {
        Station {
            id,
            name: format!("Station {id}"),
            city: "City".to_string(),
            state: "ST".to_string(),
            address: "addr".to_string(),
            retail_price: price,
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    /// An equatorial polyline where vertex `i` is exactly `i` miles from
    /// vertex `0`: at latitude 0 the haversine formula collapses to
    /// `distance = R * dlon_radians`, so spacing vertices by a fixed
    /// longitude delta gives exact, predictable mile markers.
    fn equatorial_polyline(total_miles: usize) -> Polyline {
        let deg_per_mile = (1.0 / EARTH_RADIUS_MILES) * (180.0 / PI);
        let vertices = (0..=total_miles)
            .map(|i| (0.0, -100.0 + (i as f64) * deg_per_mile))
            .collect();
        Polyline::new(vertices)
    }

    fn vertex_lat_lon(polyline: &Polyline, mile_marker: usize) -> (f64, f64) {
        polyline.vertices[mile_marker]
    }

    #[test]
    fn trip_under_one_tank_needs_no_stops() {
        let polyline = Polyline::new(vec![(34.05, -118.25), (34.42, -119.70)]);
        let (lat, lon) = polyline.vertices[0];
        let index = TestIndex(vec![
            station(1, lat + 0.01, lon, 3.20),
            station(2, lat + 0.02, lon, 3.50),
            station(3, lat + 0.03, lon, 3.80),
        ]);
        let config = OptimizerConfig::default();
        let optimizer = Optimizer::new(&config);

        let result = optimizer.optimize(&polyline, 100.0 * METERS_PER_MILE, &index).unwrap();
        assert!(result.stops.is_empty());
        assert_eq!(result.total_cost, 35.00);
        assert_eq!(result.fuel_consumed_gallons, 10.00);
    }

    #[test]
    fn long_trip_refuels_once_at_the_cheaper_station() {
        let polyline = equatorial_polyline(700);
        let (lat_a, lon_a) = vertex_lat_lon(&polyline, 480);
        let (lat_b, lon_b) = vertex_lat_lon(&polyline, 450);
        let index = TestIndex(vec![station(1, lat_a, lon_a, 3.00), station(2, lat_b, lon_b, 3.50)]);
        let config = OptimizerConfig::default();
        let optimizer = Optimizer::new(&config);

        let result = optimizer
            .optimize(&polyline, 700.0 * METERS_PER_MILE, &index)
            .unwrap();
        assert_eq!(result.stops.len(), 1);
        assert_eq!(result.stops[0].station_name, "Station 1");
        assert_eq!(result.total_cost, 210.00);
        assert_eq!(result.fuel_consumed_gallons, 70.00);
    }

    #[test]
    fn stranded_when_no_reachable_station_remains() {
        let polyline = equatorial_polyline(1200);
        let (lat, lon) = vertex_lat_lon(&polyline, 200);
        let index = TestIndex(vec![station(1, lat, lon, 3.00)]);
        let config = OptimizerConfig::default();
        let optimizer = Optimizer::new(&config);

        let err = optimizer
            .optimize(&polyline, 1200.0 * METERS_PER_MILE, &index)
            .unwrap_err();
        match err {
            OptimizerError::Stranded(mile) => assert!((mile - 200.0).abs() < 0.01, "stranded at {mile}, expected ~200"),
            other => panic!("expected Stranded, got {other:?}"),
        }
    }

    #[test]
    fn no_stations_on_a_long_route_is_an_error() {
        let polyline = equatorial_polyline(800);
        let index = TestIndex(vec![]);
        let config = OptimizerConfig::default();
        let optimizer = Optimizer::new(&config);

        let err = optimizer
            .optimize(&polyline, 800.0 * METERS_PER_MILE, &index)
            .unwrap_err();
        assert_eq!(err, OptimizerError::NoStationsOnRoute);
    }

    #[test]
    fn empty_route_is_rejected_before_touching_the_station_index() {
        let polyline = Polyline::new(vec![(34.0, -118.0)]);
        let index = TestIndex(vec![]);
        let config = OptimizerConfig::default();
        let optimizer = Optimizer::new(&config);

        let err = optimizer.optimize(&polyline, 100.0, &index).unwrap_err();
        assert_eq!(err, OptimizerError::EmptyRoute);

        let polyline = Polyline::new(vec![(34.0, -118.0), (35.0, -118.0)]);
        let err = optimizer.optimize(&polyline, 0.0, &index).unwrap_err();
        assert_eq!(err, OptimizerError::EmptyRoute);
    }

    #[test]
    fn from_geojson_coordinates_flips_lon_lat_to_lat_lon() {
        let polyline = Polyline::from_geojson_coordinates(&[[-118.25, 34.05], [-119.70, 34.42]]);
        assert_eq!(polyline.vertices[0], (34.05, -118.25));
        assert_eq!(polyline.vertices[1], (34.42, -119.70));
    }
}

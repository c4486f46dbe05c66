//! Shared coordinate math: haversine distance and bounding boxes in WGS84
//! degrees. Every other module that touches geometry goes through here
//! rather than re-deriving the constants.

use geo::{Distance, Haversine};
use geo_types::Point;

const METERS_PER_MILE: f64 = 1609.344;
const LATITUDE_DEGREE_MILES: f64 = 69.0;

/// An axis-aligned box in (latitude, longitude) degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Great-circle distance between two WGS84 points, in miles. Delegates to
/// `geo::Haversine`, the same distance algorithm `layers::transit_network`'s
/// `road_distance` fallback and `opt::aco`'s stop-to-stop scoring use over
/// `geo_types::Point` (points are `(lon, lat)`, matching that crate's axis
/// order).
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    Haversine::distance(a, b) / METERS_PER_MILE
}

/// Axis-aligned bounding box over a set of (lat, lon) points, expanded by a
/// flat degree pad on every side. Used by the Route Corridor Filter's
/// bounding-box pre-filter (pad = 0.3 degrees).
pub fn bounding_box<'a, I>(points: I, pad_degrees: f64) -> Option<BBox>
where
    I: IntoIterator<Item = &'a (f64, f64)>,
{
    let mut iter = points.into_iter();
    let &(first_lat, first_lon) = iter.next()?;

    let mut min_lat = first_lat;
    let mut max_lat = first_lat;
    let mut min_lon = first_lon;
    let mut max_lon = first_lon;

    for &(lat, lon) in iter {
        if lat < min_lat {
            min_lat = lat;
        }
        if lat > max_lat {
            max_lat = lat;
        }
        if lon < min_lon {
            min_lon = lon;
        }
        if lon > max_lon {
            max_lon = lon;
        }
    }

    Some(BBox {
        min_lat: min_lat - pad_degrees,
        max_lat: max_lat + pad_degrees,
        min_lon: min_lon - pad_degrees,
        max_lon: max_lon + pad_degrees,
    })
}

/// Bounding box around a single point for a given radius in miles, using the
/// 1 degree ~= 69 miles approximation (not a precise circle). Used by the
/// `/stations/near` endpoint.
pub fn degree_box_around(lat: f64, lon: f64, radius_miles: f64) -> BBox {
    let deg_radius = radius_miles / LATITUDE_DEGREE_MILES;
    BBox {
        min_lat: lat - deg_radius,
        max_lat: lat + deg_radius,
        min_lon: lon - deg_radius,
        max_lon: lon + deg_radius,
    }
}

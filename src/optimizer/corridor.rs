use std::sync::Arc;

use crate::geo::{bounding_box, haversine_miles};
use crate::station::{Station, StationIndex};

const BBOX_PAD_DEGREES: f64 = 0.3;
const CORRIDOR_SUBSAMPLE_TARGET: usize = 150;
const QUICK_REJECT_TOLERANCE_DEGREES: f64 = 0.15;

/// Three-phase Route Corridor Filter:
///
/// 1. bounding-box prefilter against the spatial index, padded by 0.3 degrees
/// 2. cheap L-infinity quick-reject against a ~150-vertex subsample
/// 3. precise haversine acceptance against the same subsample
pub fn filter_corridor(
    vertices: &[(f64, f64)],
    station_index: &dyn StationIndex,
    corridor_miles: f64,
) -> Vec<Arc<Station>> {
    let bbox = match bounding_box(vertices, BBOX_PAD_DEGREES) {
        Some(b) => b,
        None => return Vec::new(),
    };

    let candidates = station_index.query_bbox(bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon);

    let step = subsample_step(vertices.len(), CORRIDOR_SUBSAMPLE_TARGET);
    let subsampled: Vec<(f64, f64)> = vertices.iter().step_by(step).copied().collect();

    candidates
        .into_iter()
        .filter(|station| {
            let (s_lat, s_lon) = match station.coordinates() {
                Some(c) => c,
                None => return false,
            };

            let survives_quick_reject = subsampled.iter().any(|&(v_lat, v_lon)| {
                (v_lat - s_lat).abs() <= QUICK_REJECT_TOLERANCE_DEGREES
                    && (v_lon - s_lon).abs() <= QUICK_REJECT_TOLERANCE_DEGREES
            });
            if !survives_quick_reject {
                return false;
            }

            subsampled
                .iter()
                .any(|&(v_lat, v_lon)| haversine_miles(s_lat, s_lon, v_lat, v_lon) < corridor_miles)
        })
        .collect()
}

/// Stride that subsamples `n` vertices down to roughly `target`:
/// `step = max(1, n // target)`.
pub fn subsample_step(n: usize, target: usize) -> usize {
    (n / target).max(1)
}

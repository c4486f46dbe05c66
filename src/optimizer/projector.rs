use std::sync::Arc;

use crate::geo::haversine_miles;
use crate::station::Station;

use super::arc_length::ArcLengthTable;
use super::corridor::subsample_step;

const PROJECTION_SUBSAMPLE_TARGET: usize = 300;

/// A corridor station projected onto the route, carrying its one-dimensional
/// position along it.
pub struct ProjectedStation {
    pub station: Arc<Station>,
    pub dist_from_start: f64,
    pub price: f64,
}

/// Projects each corridor station onto its nearest vertex in a ~300-vertex
/// subsample and returns the result sorted by `dist_from_start` ascending.
///
/// Uses a coarser/denser subsample than the corridor filter's (independently
/// tunable: corridor acceptance only needs a rough pass/fail, projection
/// needs an ordinal position along the route).
pub fn project_stations(
    stations: &[Arc<Station>],
    vertices: &[(f64, f64)],
    arc_lengths: &ArcLengthTable,
) -> Vec<ProjectedStation> {
    let step = subsample_step(vertices.len(), PROJECTION_SUBSAMPLE_TARGET);
    let subsampled_indices: Vec<usize> = (0..vertices.len()).step_by(step).collect();

    let mut projected: Vec<ProjectedStation> = stations
        .iter()
        .filter_map(|station| {
            let (s_lat, s_lon) = station.coordinates()?;
            let (nearest_idx, _) = subsampled_indices
                .iter()
                .map(|&idx| {
                    let (v_lat, v_lon) = vertices[idx];
                    (idx, haversine_miles(s_lat, s_lon, v_lat, v_lon))
                })
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())?;

            Some(ProjectedStation {
                station: station.clone(),
                dist_from_start: arc_lengths.cumulative_miles[nearest_idx],
                price: station.retail_price,
            })
        })
        .collect();

    projected.sort_by(|a, b| a.dist_from_start.partial_cmp(&b.dist_from_start).unwrap());
    projected
}

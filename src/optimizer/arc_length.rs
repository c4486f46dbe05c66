use crate::geo::haversine_miles;

/// Cumulative great-circle distance along a polyline, one entry per vertex.
/// `cumulative_miles[0]` is always `0.0`; `cumulative_miles[i]` is the
/// distance traveled from the start to vertex `i`.
pub struct ArcLengthTable {
    pub cumulative_miles: Vec<f64>,
}

impl ArcLengthTable {
    pub fn build(vertices: &[(f64, f64)]) -> Self {
        let mut cumulative_miles = Vec::with_capacity(vertices.len());
        cumulative_miles.push(0.0);
        for pair in vertices.windows(2) {
            let (lat1, lon1) = pair[0];
            let (lat2, lon2) = pair[1];
            let prev = *cumulative_miles.last().unwrap();
            cumulative_miles.push(prev + haversine_miles(lat1, lon1, lat2, lon2));
        }
        ArcLengthTable { cumulative_miles }
    }

    pub fn total_miles(&self) -> f64 {
        *self.cumulative_miles.last().unwrap_or(&0.0)
    }
}

use super::error::OptimizerError;
use super::projector::ProjectedStation;
use super::{OptimizeResult, Stop};
use crate::config::OptimizerConfig;

/// Greedy Stop Selector: repeatedly refills at the cheapest station
/// reachable within the current tank range, breaking ties in favor of the
/// farther station so fewer stops are needed later.
pub fn select_stops(
    projected: &[ProjectedStation],
    total_distance_miles: f64,
    config: &OptimizerConfig,
) -> Result<OptimizeResult, OptimizerError> {
    let mut stops = Vec::new();
    let mut current_pos = 0.0;
    let mut total_cost = 0.0;
    let mut last_price: Option<f64> = None;

    while current_pos + config.tank_range_miles < total_distance_miles {
        let max_reach = current_pos + config.tank_range_miles;

        let best = projected
            .iter()
            .filter(|s| s.dist_from_start > current_pos && s.dist_from_start <= max_reach)
            .min_by(|a, b| {
                a.price
                    .partial_cmp(&b.price)
                    .unwrap()
                    .then_with(|| b.dist_from_start.partial_cmp(&a.dist_from_start).unwrap())
            });

        let best = match best {
            Some(b) => b,
            None => return Err(OptimizerError::Stranded(current_pos)),
        };

        let miles_traveled = best.dist_from_start - current_pos;
        let gallons = miles_traveled / config.mpg;
        let cost = gallons * best.price;

        stops.push(Stop {
            station_name: best.station.name.clone(),
            city: best.station.city.clone(),
            state: best.station.state.clone(),
            price_formatted: format!("${:.3}/gal", best.price),
            latitude: best.station.latitude.unwrap(),
            longitude: best.station.longitude.unwrap(),
            refill_gallons: round2(gallons),
            cost: round2(cost),
        });

        total_cost += cost;
        current_pos = best.dist_from_start;
        last_price = Some(best.price);
    }

    let remaining_miles = total_distance_miles - current_pos;
    if remaining_miles > 0.0 {
        let final_price = last_price.unwrap_or_else(|| fallback_price(projected, config));
        total_cost += (remaining_miles / config.mpg) * final_price;
    }

    Ok(OptimizeResult {
        stops,
        total_cost: round2(total_cost),
        fuel_consumed_gallons: round2(total_distance_miles / config.mpg),
    })
}

/// Price for the final leg when no refill has happened yet: the mean price
/// of corridor stations if any were found, else the configured fallback.
fn fallback_price(projected: &[ProjectedStation], config: &OptimizerConfig) -> f64 {
    if projected.is_empty() {
        config.fallback_avg_price_usd
    } else {
        projected.iter().map(|s| s.price).sum::<f64>() / projected.len() as f64
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

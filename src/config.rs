//! Tunable defaults, overridable by environment variable the way the
//! teacher's `GAConfig` takes either hand-written defaults or `with_params`
//! overrides. Magic numbers live nowhere else.

/// Physical and search parameters for [`crate::optimizer::Optimizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub tank_range_miles: f64,
    pub mpg: f64,
    pub search_corridor_miles: f64,
    pub fallback_avg_price_usd: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            tank_range_miles: 500.0,
            mpg: 10.0,
            search_corridor_miles: 10.0,
            fallback_avg_price_usd: 3.50,
        }
    }
}

impl OptimizerConfig {
    /// Overrides any field for which the matching environment variable is
    /// set and parses cleanly; falls back to [`Default`] otherwise.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        OptimizerConfig {
            tank_range_miles: env_f64("TANK_RANGE_MILES", defaults.tank_range_miles),
            mpg: env_f64("MPG", defaults.mpg),
            search_corridor_miles: env_f64("SEARCH_CORRIDOR_MILES", defaults.search_corridor_miles),
            fallback_avg_price_usd: env_f64("FALLBACK_AVG_PRICE_USD", defaults.fallback_avg_price_usd),
        }
    }
}

/// Rate limiting for the geocoding collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingConfig {
    pub rate_limit_seconds: f64,
    pub nominatim_base_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        GeocodingConfig {
            rate_limit_seconds: 1.0,
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        GeocodingConfig {
            rate_limit_seconds: env_f64("GEOCODING_RATE_LIMIT_SECONDS", defaults.rate_limit_seconds),
            nominatim_base_url: std::env::var("NOMINATIM_BASE_URL").unwrap_or(defaults.nominatim_base_url),
        }
    }
}

/// Endpoint for the routing collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    pub osrm_base_url: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            osrm_base_url: "https://router.project-osrm.org".to_string(),
        }
    }
}

impl RoutingConfig {
    pub fn from_env() -> Self {
        RoutingConfig {
            osrm_base_url: std::env::var("OSRM_BASE_URL").unwrap_or_else(|_| Self::default().osrm_base_url),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimizer_config_defaults_match_spec_constants() {
        let config = OptimizerConfig::default();
        assert_eq!(config.tank_range_miles, 500.0);
        assert_eq!(config.mpg, 10.0);
        assert_eq!(config.search_corridor_miles, 10.0);
        assert_eq!(config.fallback_avg_price_usd, 3.50);
    }

    #[test]
    fn geocoding_config_defaults_to_one_second() {
        assert_eq!(GeocodingConfig::default().rate_limit_seconds, 1.0);
    }
}

//! Address -> coordinate lookups against Nominatim, the collaborator
//! `original_source`'s `geocoding_service.py` calls directly. Ported to a
//! blocking `reqwest::Client` the way `evefrontier-lib::github` talks to the
//! GitHub releases API.

pub mod error;

use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

pub use error::GeocodingError;
use crate::config::GeocodingConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NominatimEntry {
    lat: String,
    lon: String,
}

/// Synchronous Nominatim client. One instance is shared by a geocoding run;
/// callers are expected to pace requests through [`RateLimiter`] themselves
/// so that batch jobs can group requests (e.g. by city) without paying the
/// per-station delay for lookups they already cached.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Self {
        NominatimClient {
            client: Client::builder()
                .user_agent("fuel-route-optimizer/0.1")
                .build()
                .expect("reqwest client builder"),
            base_url: config.nominatim_base_url.clone(),
        }
    }

    /// Geocodes a free-text address query, taking the first (best-ranked)
    /// result the way `geocoding_service.py` does.
    pub fn geocode(&self, query: &str) -> Result<GeocodeResult, GeocodingError> {
        debug!("geocoding {query:?}");
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1"), ("countrycodes", "us")])
            .send()?
            .error_for_status()?;

        let entries: Vec<NominatimEntry> = response.json()?;
        let entry = entries.into_iter().next().ok_or_else(|| GeocodingError::NoResults(query.to_string()))?;
        parse_entry(entry, query)
    }
}

/// Parses a Nominatim result's string lat/lon into floats, surfacing a
/// [`GeocodingError::MalformedCoordinate`] instead of silently coercing a
/// bad value to `NaN` -- a `NaN` coordinate would pass `f64` typechecking but
/// make `Station::geocoded()` permanently false with no diagnostic trail,
/// since every `NaN` range comparison returns false.
fn parse_entry(entry: NominatimEntry, query: &str) -> Result<GeocodeResult, GeocodingError> {
    let latitude = entry.lat.parse().map_err(|_| GeocodingError::MalformedCoordinate {
        query: query.to_string(),
        value: entry.lat.clone(),
    })?;
    let longitude = entry.lon.parse().map_err(|_| GeocodingError::MalformedCoordinate {
        query: query.to_string(),
        value: entry.lon.clone(),
    })?;
    Ok(GeocodeResult { latitude, longitude })
}

/// Enforces a minimum delay between successive geocoding calls, the way
/// `geocoding_service.py` sleeps `GEOCODING_RATE_LIMIT_SECONDS` between
/// Nominatim requests to stay within its usage policy.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(config: &GeocodingConfig) -> Self {
        RateLimiter {
            min_interval: Duration::from_secs_f64(config.rate_limit_seconds.max(0.0)),
            last_call: None,
        }
    }

    /// Blocks, if necessary, so at least `min_interval` has elapsed since
    /// the previous call returned.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}

pub mod error;

use std::sync::Arc;

use rstar::{RTree, RTreeObject, AABB};
use rusqlite::{params, Connection};

pub use error::StationError;

/// A retail fuel location.
///
/// `latitude`/`longitude` are either both present or both absent; the
/// optimizer only ever considers a station for which [`Station::geocoded`]
/// returns true.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    /// Price per gallon in USD, three decimal places.
    pub retail_price: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Station {
    /// True when both coordinates are present and within valid WGS84 range.
    pub fn geocoded(&self) -> bool {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon),
            _ => false,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        if self.geocoded() {
            Some((self.latitude.unwrap(), self.longitude.unwrap()))
        } else {
            None
        }
    }
}

/// Which stations a geocoding run should prioritize, mirroring
/// `geocode_stations.py --strategy`'s `cheapest`/`all`/`missing` choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeStrategy {
    /// Cheapest stations first (the default -- geocode the ones most likely
    /// to matter for a price-sensitive route before the rest of the corpus).
    Cheapest,
    /// Every matching station, in the model's default price order.
    All,
    /// Only stations with a literally absent latitude or longitude, even
    /// under `--force`.
    Missing,
}

/// Read-only capability the Optimizer is injected with. The production
/// implementation is [`InMemoryStationIndex`]; tests use an in-memory
/// `Vec`-backed stub (see `optimizer` module tests).
pub trait StationIndex: Send + Sync {
    /// Stations that are geocoded and fall within the given box.
    fn query_bbox(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Vec<Arc<Station>>;
}

struct RTreeStation {
    envelope: AABB<[f64; 2]>,
    station: Arc<Station>,
}

impl RTreeObject for RTreeStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over geocoded stations, queried via an R-tree the way
/// `RoadNetwork`/`GridNetwork` index intersections and zones. Built once at
/// load time; out-of-band geocoding jobs rebuild and swap a fresh index
/// rather than mutating this one in place.
pub struct InMemoryStationIndex {
    tree: RTree<RTreeStation>,
}

impl InMemoryStationIndex {
    pub fn build(stations: impl IntoIterator<Item = Station>) -> Self {
        let mut tree = RTree::new();
        for station in stations {
            if !station.geocoded() {
                continue;
            }
            let (lat, lon) = station.coordinates().unwrap();
            tree.insert(RTreeStation {
                envelope: AABB::from_point([lat, lon]),
                station: Arc::new(station),
            });
        }
        InMemoryStationIndex { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl StationIndex for InMemoryStationIndex {
    fn query_bbox(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Vec<Arc<Station>> {
        let envelope = AABB::from_corners([min_lat, min_lon], [max_lat, max_lon]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|node| node.station.clone())
            .collect()
    }
}

/// Persistence layer: loads and saves stations via sqlite, the way
/// `RoadNetwork::load` and `GridNetwork::load` open a `Connection` and read
/// rows. Not on the optimizer's hot path -- `to_index()` materializes an
/// [`InMemoryStationIndex`] for request handling.
pub struct SqliteStationStore {
    conn: Connection,
}

impl SqliteStationStore {
    pub fn open(path: &str) -> Result<Self, StationError> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                address TEXT NOT NULL,
                retail_price REAL NOT NULL,
                latitude REAL,
                longitude REAL,
                geocoded INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            params![],
        )?;
        Ok(SqliteStationStore { conn })
    }

    pub fn insert_all(&mut self, stations: &[Station]) -> Result<usize, StationError> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO stations
                    (id, name, city, state, address, retail_price, latitude, longitude, geocoded, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    name=excluded.name, city=excluded.city, state=excluded.state,
                    address=excluded.address, retail_price=excluded.retail_price,
                    latitude=excluded.latitude, longitude=excluded.longitude,
                    geocoded=excluded.geocoded",
            )?;
            for station in stations {
                stmt.execute(params![
                    station.id,
                    station.name,
                    station.city,
                    station.state,
                    station.address,
                    station.retail_price,
                    station.latitude,
                    station.longitude,
                    station.geocoded() as i64,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(stations.len())
    }

    pub fn update_coordinates(&self, id: i64, latitude: f64, longitude: f64) -> Result<(), StationError> {
        let updated = self.conn.execute(
            "UPDATE stations SET latitude = ?1, longitude = ?2, geocoded = 1 WHERE id = ?3",
            params![latitude, longitude, id],
        )?;
        if updated == 0 {
            return Err(StationError::NotFound(id));
        }
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<Station>, StationError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, city, state, address, retail_price, latitude, longitude FROM stations",
        )?;
        let rows = stmt.query_map(params![], |row| {
            Ok(Station {
                id: row.get(0)?,
                name: row.get(1)?,
                city: row.get(2)?,
                state: row.get(3)?,
                address: row.get(4)?,
                retail_price: row.get(5)?,
                latitude: row.get(6)?,
                longitude: row.get(7)?,
            })
        })?;
        let mut stations = Vec::new();
        for row in rows {
            stations.push(row?);
        }
        Ok(stations)
    }

    /// Stations to (re)geocode, following `geocode_stations.py`'s
    /// `_get_stations_to_geocode`: filter by state and (unless `force`)
    /// by "not already geocoded", apply the strategy's own extra filter,
    /// then sort by `(retail_price, name)` -- the ordering the Python
    /// model's `Meta.ordering` applies by default, which `cheapest` makes
    /// explicit and `all`/`missing` inherit -- before truncating to `limit`.
    pub fn stations_needing_geocoding(
        &self,
        state: Option<&str>,
        limit: usize,
        force: bool,
        strategy: GeocodeStrategy,
    ) -> Result<Vec<Station>, StationError> {
        let mut stations = self.load_all()?;
        if let Some(st) = state {
            stations.retain(|s| s.state.eq_ignore_ascii_case(st));
        }
        if !force {
            stations.retain(|s| !s.geocoded());
        }
        if strategy == GeocodeStrategy::Missing {
            stations.retain(|s| s.latitude.is_none() || s.longitude.is_none());
        }
        stations.sort_by(|a, b| {
            a.retail_price
                .partial_cmp(&b.retail_price)
                .unwrap()
                .then_with(|| a.name.cmp(&b.name))
        });
        stations.truncate(limit);
        Ok(stations)
    }

    pub fn to_index(&self) -> Result<InMemoryStationIndex, StationError> {
        Ok(InMemoryStationIndex::build(self.load_all()?))
    }

    /// Wipes every row, for a `--clear` bulk reload.
    pub fn clear_all(&self) -> Result<(), StationError> {
        self.conn.execute("DELETE FROM stations", params![])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: i64, lat: Option<f64>, lon: Option<f64>, price: f64) -> Station {
        Station {
            id,
            name: format!("Station {id}"),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            address: "1 Main St".to_string(),
            retail_price: price,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn geocoded_requires_both_coordinates_in_range() {
        assert!(station(1, Some(40.0), Some(-89.0), 3.0).geocoded());
        assert!(!station(2, None, None, 3.0).geocoded());
        assert!(!station(3, Some(91.0), Some(-89.0), 3.0).geocoded());
        assert!(!station(4, Some(40.0), Some(-181.0), 3.0).geocoded());
    }

    #[test]
    fn in_memory_index_excludes_ungeocoded_stations() {
        let index = InMemoryStationIndex::build(vec![
            station(1, Some(40.0), Some(-89.0), 3.0),
            station(2, None, None, 3.5),
        ]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn in_memory_index_query_bbox_filters_by_box() {
        let index = InMemoryStationIndex::build(vec![
            station(1, Some(40.0), Some(-89.0), 3.0),
            station(2, Some(50.0), Some(-70.0), 3.5),
        ]);
        let found = index.query_bbox(39.0, 41.0, -90.0, -88.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn sqlite_store_round_trips_stations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        store
            .insert_all(&[station(1, Some(40.0), Some(-89.0), 3.199)])
            .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].retail_price, 3.199);

        store.update_coordinates(1, 41.5, -90.5).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded[0].latitude, Some(41.5));
    }

    #[test]
    fn clear_all_empties_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        store
            .insert_all(&[station(1, Some(40.0), Some(-89.0), 3.199)])
            .unwrap();
        store.clear_all().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn stations_needing_geocoding_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        store
            .insert_all(&[
                station(1, Some(40.0), Some(-89.0), 3.199),
                station(2, None, None, 3.5),
            ])
            .unwrap();

        let pending = store
            .stations_needing_geocoding(None, 10, false, GeocodeStrategy::Cheapest)
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);

        let forced = store
            .stations_needing_geocoding(None, 10, true, GeocodeStrategy::Cheapest)
            .unwrap();
        assert_eq!(forced.len(), 2);
    }

    #[test]
    fn missing_strategy_only_returns_stations_with_a_null_coordinate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        store
            .insert_all(&[
                station(1, Some(91.0), Some(-89.0), 3.199), // geocoded()==false but not null
                station(2, None, None, 3.5),
                station(3, Some(40.0), Some(-89.0), 3.0),
            ])
            .unwrap();

        let missing = store
            .stations_needing_geocoding(None, 10, true, GeocodeStrategy::Missing)
            .unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, 2);
    }

    #[test]
    fn cheapest_strategy_sorts_by_price_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        store
            .insert_all(&[
                station(1, None, None, 3.50),
                station(2, None, None, 2.99),
                station(3, None, None, 3.10),
            ])
            .unwrap();

        let ordered = store
            .stations_needing_geocoding(None, 10, false, GeocodeStrategy::Cheapest)
            .unwrap();
        let ids: Vec<i64> = ordered.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn sqlite_store_update_missing_station_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let store = SqliteStationStore::open(path.to_str().unwrap()).unwrap();
        let err = store.update_coordinates(42, 1.0, 2.0).unwrap_err();
        assert!(matches!(err, StationError::NotFound(42)));
    }
}

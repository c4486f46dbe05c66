use std::collections::HashMap;

use clap::{Parser, Subcommand, ValueEnum};

use fuel_route_optimizer::config::GeocodingConfig;
use fuel_route_optimizer::geocoding::{NominatimClient, RateLimiter};
use fuel_route_optimizer::ingest::load_stations_csv;
use fuel_route_optimizer::station::{GeocodeStrategy, SqliteStationStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bulk-load a fuel station CSV corpus into the sqlite database.
    LoadStations {
        #[arg(long = "file")]
        file: String,
        #[arg(long)]
        db_path: String,
        /// Wipe the existing table before loading.
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Geocode stations missing coordinates, grouped by city to cut down on
    /// API calls.
    GeocodeStations {
        #[arg(long)]
        db_path: String,
        #[arg(long)]
        state: Option<String>,
        #[arg(long, default_value_t = 1000)]
        limit: usize,
        /// Re-geocode stations that already have coordinates.
        #[arg(long, default_value_t = false)]
        force: bool,
        /// Which stations to prioritize: cheapest first (default), every
        /// matching station, or only ones with a literally absent coordinate.
        #[arg(long, value_enum, default_value = "cheapest")]
        strategy: StrategyArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StrategyArg {
    Cheapest,
    All,
    Missing,
}

impl From<StrategyArg> for GeocodeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Cheapest => GeocodeStrategy::Cheapest,
            StrategyArg::All => GeocodeStrategy::All,
            StrategyArg::Missing => GeocodeStrategy::Missing,
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::LoadStations { file, db_path, clear } => load_stations(&file, &db_path, clear),
        Command::GeocodeStations {
            db_path,
            state,
            limit,
            force,
            strategy,
        } => geocode_stations(&db_path, state.as_deref(), limit, force, strategy.into()),
    }
}

fn load_stations(csv_path: &str, db_path: &str, clear: bool) {
    println!("Reading fuel stations from {csv_path}");
    let (stations, errors) = load_stations_csv(csv_path).expect("failed to read station CSV");
    println!("Parsed {} stations, {} malformed rows skipped", stations.len(), errors.len());
    for err in errors.iter().take(20) {
        println!("  line {}: {}", err.line_number, err.message);
    }

    let mut store = SqliteStationStore::open(db_path).expect("failed to open station database");
    if clear {
        store.clear_all().expect("failed to clear existing stations");
        println!("Cleared existing stations from {db_path}");
    }
    let inserted = store.insert_all(&stations).expect("failed to insert stations");
    println!("Loaded {inserted} stations into {db_path}");
}

fn geocode_stations(db_path: &str, state: Option<&str>, limit: usize, force: bool, strategy: GeocodeStrategy) {
    let store = SqliteStationStore::open(db_path).expect("failed to open station database");
    let stations = store
        .stations_needing_geocoding(state, limit, force, strategy)
        .expect("failed to query stations needing geocoding");

    if stations.is_empty() {
        println!("No stations to geocode");
        return;
    }

    let total = stations.len();

    // Group by city to avoid geocoding the same place once per station,
    // preserving the order `stations_needing_geocoding` already sorted by --
    // under `--strategy cheapest` that means the city holding the cheapest
    // station is geocoded first.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut cities: HashMap<(String, String), Vec<i64>> = HashMap::new();
    for station in &stations {
        let key = (station.city.clone(), station.state.clone());
        if !cities.contains_key(&key) {
            order.push(key.clone());
        }
        cities.entry(key).or_default().push(station.id);
    }
    println!("Found {total} stations to geocode across {} unique cities", cities.len());

    let config = GeocodingConfig::from_env();
    let client = NominatimClient::new(&config);
    let mut limiter = RateLimiter::new(&config);

    let mut successful = 0usize;
    let mut failed = 0usize;

    for (city, state) in order {
        let station_ids = cities.remove(&(city.clone(), state.clone())).unwrap();
        limiter.wait();
        let query = format!("{city}, {state}");
        match client.geocode(&query) {
            Ok(coords) => {
                for id in &station_ids {
                    store
                        .update_coordinates(*id, coords.latitude, coords.longitude)
                        .expect("failed to save geocoded coordinates");
                }
                successful += station_ids.len();
                println!(
                    "  {query}: ({:.4}, {:.4}) [{} stations]",
                    coords.latitude,
                    coords.longitude,
                    station_ids.len()
                );
            }
            Err(err) => {
                failed += station_ids.len();
                println!("  failed to geocode {query}: {err}");
            }
        }
    }

    println!("Done: {successful} geocoded, {failed} failed, out of {total}");
}

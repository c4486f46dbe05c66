use std::net::SocketAddr;

use actix_web::web::Data;
use clap::Parser;

use fuel_route_optimizer::server::{self, AppState};
use fuel_route_optimizer::station::{InMemoryStationIndex, SqliteStationStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the sqlite database holding the station corpus.
    #[arg(long, default_value = "stations.db")]
    db_path: String,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = SqliteStationStore::open(&args.db_path).expect("failed to open station database");
    let stations = store.load_all().expect("failed to load stations");
    log::info!("loaded {} stations from {}", stations.len(), args.db_path);
    let index = InMemoryStationIndex::build(stations);
    log::info!("{} stations are geocoded and queryable", index.len());

    let state = Data::new(AppState::new(index));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .expect("invalid host/port");

    server::run(addr, state).await
}

//! HTTP surface: an `App` built from `#[get]`/`#[post]`-annotated handlers
//! plus a CORS middleware, served by `HttpServer`.

pub mod cors;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use log::info;

pub use state::AppState;

pub async fn run(addr: SocketAddr, state: Data<AppState>) -> std::io::Result<()> {
    info!("starting server on {addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(cors::cors_middleware())
            .app_data(state.clone())
            .service(handlers::optimize_route)
            .service(handlers::stations_near)
    })
    .bind(addr)?
    .run()
    .await
}

use actix_web::{get, post, web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::geo::degree_box_around;
use crate::optimizer::Optimizer;

use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RouteOptimizationRequest {
    start_location: String,
    end_location: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: actix_web::http::StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message.into() })
}

/// `POST /api/v1/route/optimize`: geocode both endpoints, fetch a driving
/// route, then run the optimizer over it. Orchestration mirrors
/// `original_source`'s `RoutingService.calculate_optimal_route`.
#[post("/api/v1/route/optimize")]
pub async fn optimize_route(state: web::Data<AppState>, body: web::Json<RouteOptimizationRequest>) -> impl Responder {
    let start_location = body.start_location.trim().to_string();
    let end_location = body.end_location.trim().to_string();

    if start_location.len() < 3 {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Start location must be at least 3 characters long.",
        );
    }
    if end_location.len() < 3 {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "End location must be at least 3 characters long.",
        );
    }
    if start_location.eq_ignore_ascii_case(&end_location) {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Start and end locations must be different.",
        );
    }

    let state = state.into_inner();
    let start_location_for_task = start_location.clone();
    let end_location_for_task = end_location.clone();

    let result = web::block(move || {
        let start = state.geocoding_client.geocode(&start_location_for_task)?;
        let end = state.geocoding_client.geocode(&end_location_for_task)?;

        let route = state
            .routing_client
            .route((start.latitude, start.longitude), (end.latitude, end.longitude))?;

        let optimizer = Optimizer::new(&state.optimizer_config);
        let index = state.station_index.read().expect("station index lock poisoned");
        let optimized = optimizer.optimize(&route.polyline, route.distance_meters, &*index)?;

        Ok::<_, HandlerError>((route, optimized))
    })
    .await;

    match result {
        Ok(Ok((route, optimized))) => HttpResponse::Ok().json(serde_json::json!({
            "route": {
                "start": start_location,
                "end": end_location,
                "distance_miles": round1(route.distance_meters * 0.000_621_371),
                "duration_hours": round1(route.duration_seconds / 3600.0),
                "geometry": { "coordinates": route.polyline.to_geojson_coordinates() },
            },
            "stops": optimized.stops,
            "total_cost": optimized.total_cost,
            "fuel_consumed_gallons": optimized.fuel_consumed_gallons,
        })),
        Ok(Err(err)) => {
            warn!("route optimization failed: {err}");
            error_response(actix_web::http::StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("route optimization task panicked: {err}");
            error_response(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum HandlerError {
    #[error(transparent)]
    Geocoding(#[from] crate::geocoding::GeocodingError),
    #[error(transparent)]
    Routing(#[from] crate::routing::RoutingError),
    #[error(transparent)]
    Optimizer(#[from] crate::optimizer::OptimizerError),
}

#[derive(Debug, Deserialize)]
pub struct StationsNearQuery {
    lat: f64,
    lon: f64,
    #[serde(default = "default_radius")]
    radius: f64,
}

fn default_radius() -> f64 {
    10.0
}

/// `GET /api/v1/stations/near`: bounding-box lookup for a map UI, the way
/// `StationsNearView` does a coarse degree-box filter rather than a precise
/// radius check.
#[get("/api/v1/stations/near")]
pub async fn stations_near(state: web::Data<AppState>, query: web::Query<StationsNearQuery>) -> impl Responder {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return error_response(actix_web::http::StatusCode::BAD_REQUEST, "Invalid lat, lon, or radius parameters.");
    }
    let radius = query.radius.clamp(1.0, 50.0);

    let bbox = degree_box_around(query.lat, query.lon, radius);
    let index = state.station_index.read().expect("station index lock poisoned");
    let stations = index.query_bbox(bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon);
    info!("stations/near found {} candidates within {radius}mi", stations.len());

    let stations: Vec<_> = stations
        .iter()
        .map(|s| {
            let (lat, lon) = s.coordinates().unwrap();
            serde_json::json!({
                "id": s.id,
                "station": s.name,
                "city": s.city,
                "state": s.state,
                "price": s.retail_price,
                "lat": lat,
                "lon": lon,
                "address": s.address,
            })
        })
        .collect();

    HttpResponse::Ok().json(serde_json::json!({ "stations": stations }))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

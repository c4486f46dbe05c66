use actix_cors::Cors;
use actix_web::http::header;

/// Permissive CORS policy for the public route-planning API -- there is no
/// session or API key to protect, so any origin may call in.
pub fn cors_middleware() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

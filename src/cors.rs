use actix_cors::Cors;

const PREFLIGHT_MAX_AGE: usize = 3600;

/// Cross-origin policy for browser clients. An empty list allows any origin.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(PREFLIGHT_MAX_AGE);
    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

use actix_cors::Cors;
use actix_web::http::{header, Method};

use crate::settings::AppConfig;

/// Builds the CORS policy from `cors_allowed_origins`; `*` allows any origin.
pub fn cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();

    let cors = Cors::default()
        .allowed_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

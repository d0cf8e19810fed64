use actix_web::{error::JsonPayloadError, web};

use crate::{constants::JSON_BODY_LIMIT, errors::AppError};

/// Routes body parse failures through `AppError` so they share its format.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| body_error(err).into()),
    );
}

fn body_error(err: JsonPayloadError) -> AppError {
    let message = match &err {
        JsonPayloadError::Deserialize(e) => e.to_string(),
        JsonPayloadError::ContentType => "expected Content-Type: application/json".to_string(),
        other => other.to_string(),
    };
    tracing::debug!(error = %err, "Rejected request body");
    AppError::MalformedBody(message)
}

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};
use zeroize::Zeroizing;

use crate::{auth::admin_token::AdminGate, errors::AppError};

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Confirms the admin secret so a client can start sending it as a
/// `Bearer` token.
#[instrument(skip(gate, data))]
pub async fn create_session(
    gate: web::Data<AdminGate>,
    data: web::Json<AdminLoginRequest>,
) -> Result<impl Responder, AppError> {
    let password = Zeroizing::new(data.into_inner().password);
    if !gate.verify(&password) {
        warn!("Rejected admin login attempt");
        return Err(AppError::UnauthorizedAccess);
    }

    Ok(HttpResponse::Ok().json(json!({ "authenticated": true })))
}

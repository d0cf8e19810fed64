use actix_web::{http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{auth::admin_token::AdminGate, errors::AppError};

/// Proof that the request carried the admin secret as a `Bearer` token.
/// Returns 401 otherwise.
/// Usage: add `_admin: AdminSession` to a handler, or `Option<AdminSession>`
/// when admin access only widens what the handler returns.
#[derive(Debug)]
pub struct AdminSession;

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(gate) = req.app_data::<web::Data<AdminGate>>() else {
            tracing::error!("AdminGate missing from app data");
            return ready(Err(AppError::UnauthorizedAccess));
        };

        let authorized = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| gate.verify_bearer(value));

        if authorized {
            ready(Ok(AdminSession))
        } else {
            ready(Err(AppError::UnauthorizedAccess))
        }
    }
}

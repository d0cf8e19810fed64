use actix_web::web;

use crate::handlers::admin;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/session").route(web::post().to(admin::create_session)));
}

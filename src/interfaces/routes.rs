use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod admin;
mod blog;
mod json_error;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .service(health_check)
            .configure(admin::config_routes)
            .configure(projects::config_routes)
            .configure(blog::config_routes),
    );

    cfg.configure(json_error::config_routes);
}

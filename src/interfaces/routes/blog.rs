use actix_web::web;

use crate::handlers::blog_posts;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog")
            .service(
                web::resource("")
                    .route(web::get().to(blog_posts::list_blog_posts))
                    .route(web::post().to(blog_posts::create_blog_post)),
            )
            // Literal segments are registered before `/{post_id}`.
            .service(web::resource("/trending").route(web::get().to(blog_posts::list_trending)))
            .service(
                web::resource("/priority/{priority}")
                    .route(web::get().to(blog_posts::list_by_priority)),
            )
            .service(
                web::resource("/slug/{slug}")
                    .route(web::get().to(blog_posts::get_blog_post_by_slug)),
            )
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(blog_posts::get_blog_post))
                    .route(web::put().to(blog_posts::update_blog_post))
                    .route(web::patch().to(blog_posts::update_blog_post))
                    .route(web::delete().to(blog_posts::delete_blog_post)),
            )
            .service(web::resource("/{post_id}/views").route(web::post().to(blog_posts::record_view)))
            .service(web::resource("/{post_id}/likes").route(web::post().to(blog_posts::record_like))),
    );
}

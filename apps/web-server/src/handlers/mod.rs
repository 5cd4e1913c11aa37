//! HTTP handlers and route configuration.

mod convert;
mod health;
mod posts;
mod users;


use actix_web::web;
use std::sync::Arc;

use quill_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// Register and login share one rate-limited scope. The fixed `/users/...`
/// paths are registered before `/users/{id}` so they win the match.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .wrap(RateLimitMiddleware::new(limiter.clone()))
                            .route(web::post().to(users::register)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(RateLimitMiddleware::new(limiter))
                            .route(web::post().to(users::login)),
                    )
                    .route("/logout", web::post().to(users::logout))
                    .route("/me", web::get().to(users::me))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user))
                    .route("/{id}/posts", web::get().to(users::user_posts)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}

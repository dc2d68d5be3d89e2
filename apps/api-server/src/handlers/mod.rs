//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod likes;
mod posts;
mod subscription;

use actix_web::web;

/// Configure all application routes. Everything except the health check
/// requires an authenticated identity.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Subscription ledger
            .service(
                web::scope("/subscription")
                    .route("", web::get().to(subscription::status))
                    .route("", web::post().to(subscription::activate)),
            )
            // Posts and their engagement surface
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{slug}", web::get().to(posts::detail))
                    .route("/{slug}", web::put().to(posts::update))
                    .route("/{slug}", web::delete().to(posts::delete))
                    .route("/{slug}/comments", web::post().to(comments::create))
                    .route("/{slug}/like", web::post().to(likes::toggle)),
            ),
    );
}

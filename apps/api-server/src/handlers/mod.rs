//! HTTP handlers and route configuration.

mod accounts;
mod comments;
mod health;
mod posts;
mod view;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
///
/// `/posts/create/` is registered before `/posts/{post_id}/` so the literal
/// segment wins the match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/accounts")
                .route("/register", web::post().to(accounts::register))
                .route("/login", web::post().to(accounts::login))
                .route("/me", web::get().to(accounts::me)),
        )
        .route("/category/{category_slug}/", web::get().to(posts::category))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/create/", web::get().to(posts::compose))
        .route("/posts/create/", web::post().to(posts::create))
        .route("/posts/{post_id}/", web::get().to(posts::detail))
        .route("/posts/{post_id}/", web::post().to(comments::submit))
        .route("/posts/{post_id}/edit/", web::get().to(posts::edit))
        .route("/posts/{post_id}/edit/", web::post().to(posts::update))
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}/",
            web::get().to(comments::edit),
        )
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}/",
            web::post().to(comments::update),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}/",
            web::get().to(comments::confirm_delete),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}/",
            web::post().to(comments::delete),
        );
}

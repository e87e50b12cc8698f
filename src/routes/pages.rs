use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Page Router Module
///
/// One route per page of the portal, all served by `render_page`. Redirects are not
/// decided here: the access gate runs before any of these handlers.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // Public pages.
        .route("/", get(handlers::render_page))
        .route("/login", get(handlers::render_page))
        .route("/register", get(handlers::render_page))
        .route("/recover-password", get(handlers::render_page))
        .route("/reset-password", get(handlers::render_page))
        // Initial assessment, only reachable with a session and no completion flag.
        .route("/test", get(handlers::render_page))
        // Dashboard.
        .route("/dashboard", get(handlers::render_page))
        .route("/dashboard/chat", get(handlers::render_page))
        .route("/dashboard/groups", get(handlers::render_page))
        .route("/dashboard/groups/{id}", get(handlers::render_page))
        .route("/dashboard/posts", get(handlers::render_page))
        .route("/dashboard/posts/{id}", get(handlers::render_page))
        .route("/dashboard/activities", get(handlers::render_page))
        .route("/dashboard/profile", get(handlers::render_page))
        .route(
            "/dashboard/profile/change-password",
            get(handlers::render_page),
        )
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Endpoints that act on behalf of the signed-in user. Each handler takes the
/// `Authenticated` extractor and forwards its token; the collaborators decide what
/// the token is allowed to do.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route(
            "/api/session/change-password",
            post(handlers::change_password),
        )
        // POST /api/assessment/submit
        // Scores the answers and sets the completion flag cookie.
        .route("/api/assessment/submit", post(handlers::submit_assessment))
        // --- Posts ---
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/posts/{id}", get(handlers::get_post))
        .route("/api/posts/{id}/like", post(handlers::like_post))
        .route("/api/posts/{id}/save", post(handlers::save_post))
        // --- Comments ---
        // GET /api/comments?post_id=...
        .route(
            "/api/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/api/comments/{id}/like", post(handlers::like_comment))
        // --- Chat ---
        .route("/api/chat/send", post(handlers::send_chat_message))
        .route("/api/chat/history", get(handlers::get_chat_history))
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints callable without a session. The session routes write or clear cookies
/// themselves; none of them needs a token on the way in.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness check for load balancers.
        .route("/api/health", get(|| async { "ok" }))
        // --- Session ---
        .route("/api/session/login", post(handlers::login))
        .route("/api/session/register", post(handlers::register))
        // Clears cookies even when there is no session to end.
        .route("/api/session/logout", post(handlers::logout))
        // 401 without a token cookie; never calls the auth service.
        .route("/api/session/me", get(handlers::get_session))
        .route(
            "/api/session/recover-password",
            post(handlers::recover_password),
        )
        .route("/api/session/reset-password", post(handlers::reset_password))
        // --- Assessment ---
        // The questionnaire is static, so it is served to anyone.
        .route("/api/assessment/questions", get(handlers::get_questions))
}

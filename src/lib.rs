use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod assessment;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod optimistic;
pub mod pages;
pub mod services;
pub mod session;
pub mod validation;

// Pages behind the access gate, public session endpoints, token-checked relays.
pub mod routes;
use auth::Authenticated;
use routes::{authenticated, pages as page_routes, public};

// --- Public Re-exports ---

pub use assessment::AssessmentFlag;
pub use config::AppConfig;
use services::ApiClient;
pub use services::{
    AuthState, ChatState, CommentsState, HttpAuthService, HttpChatService, HttpCommentsService,
    HttpPostsService, MockAuthService, PostsState,
};
pub use session::SessionStore;

/// ApiDoc
///
/// OpenAPI document for the `/api` surface, served at `/api/openapi.json` with the
/// Swagger UI under `/api/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register, handlers::logout, handlers::get_session,
        handlers::recover_password, handlers::reset_password, handlers::change_password,
        handlers::get_questions, handlers::submit_assessment,
        handlers::list_posts, handlers::get_post, handlers::create_post, handlers::like_post,
        handlers::save_post, handlers::list_comments, handlers::create_comment,
        handlers::like_comment, handlers::send_chat_message, handlers::get_chat_history
    ),
    components(
        schemas(
            models::LoginRequest, models::RegisterForm, models::RecoverPasswordRequest,
            models::ResetPasswordForm, models::ChangePasswordForm, models::SessionResponse,
            models::RegisterResponse, models::Author, models::Post, models::PostPage,
            models::NewPost, models::Comment, models::CommentPage, models::NewComment,
            models::ChatSender, models::ChatMessage, models::SendMessageRequest,
            models::ChatReply, models::AssessmentSubmission, models::ErrorBody,
            session::SessionUser, session::UserId,
            assessment::Question, assessment::AnswerOption, assessment::AssessmentResult,
            assessment::AnxietyLevel,
            pages::Page, pages::PageView, pages::NavSection,
        )
    ),
    tags(
        (name = "calma-portal", description = "Calma web portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Everything a request may need: configuration, the cookie-backed session and
/// assessment stores, and one handle per external collaborator. Cloned per request,
/// so every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub assessment: AssessmentFlag,
    pub auth: AuthState,
    pub posts: PostsState,
    pub comments: CommentsState,
    pub chat: ChatState,
}

impl AppState {
    /// new
    ///
    /// Wires the HTTP collaborators against the configured base URLs. Auth, posts
    /// and comments live on the backend API; chat has its own server. All of them
    /// share one connection pool.
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();
        let api = ApiClient::new(http.clone(), config.api_url.clone());
        let chat = ApiClient::new(http, config.chat_url.clone());

        Self {
            sessions: SessionStore::new(&config),
            assessment: AssessmentFlag::new(&config),
            auth: Arc::new(HttpAuthService::new(api.clone())),
            posts: Arc::new(HttpPostsService::new(api.clone())),
            comments: Arc::new(HttpCommentsService::new(api)),
            chat: Arc::new(HttpChatService::new(chat)),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(app_state: &AppState) -> SessionStore {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AssessmentFlag {
    fn from_ref(app_state: &AppState) -> AssessmentFlag {
        app_state.assessment.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for PostsState {
    fn from_ref(app_state: &AppState) -> PostsState {
        app_state.posts.clone()
    }
}

impl FromRef<AppState> for CommentsState {
    fn from_ref(app_state: &AppState) -> CommentsState {
        app_state.comments.clone()
    }
}

impl FromRef<AppState> for ChatState {
    fn from_ref(app_state: &AppState) -> ChatState {
        app_state.chat.clone()
    }
}

/// auth_middleware
///
/// Guards the relay routes. `Authenticated` rejects with 401 when the token cookie
/// is missing, so the handler never runs without a token to forward.
async fn auth_middleware(_session: Authenticated, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles pages, API routes and middleware. The access gate wraps every route and
/// the fallback; it skips `/api` paths itself, which authenticate per route instead.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(page_routes::page_routes())
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .fallback(handlers::render_page)
        // Must come after every route and the fallback so the gate sees them all.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::access_gate,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the request id, so every log line of a request
/// can be correlated. Only the path is recorded; query strings may carry reset
/// tokens.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}

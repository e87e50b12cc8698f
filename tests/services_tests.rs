use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use calma_portal::{
    error::ApiError,
    models::{LoginRequest, NewComment, RegisterRequest},
    services::{
        ApiClient, AuthService, ChatService, CommentsService, HttpAuthService, HttpChatService,
        HttpCommentsService, HttpPostsService, PostsService, error_message,
    },
    session::{SessionToken, UserId},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::net::TcpListener;

// --- Fake collaborator server ---

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn fake_login(Json(body): Json<Value>) -> Response {
    match body["email"].as_str().unwrap_or_default() {
        "ana@example.com" => Json(json!({
            "status": "success",
            "token": "tok-ana",
            "user": { "id": 7, "email": "ana@example.com", "name": "Ana" }
        }))
        .into_response(),
        "locked@example.com" => Json(json!({
            "status": "error",
            "message": "Account locked"
        }))
        .into_response(),
        "notoken@example.com" => Json(json!({ "status": "success" })).into_response(),
        "broken@example.com" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn fake_register(Json(body): Json<Value>) -> Response {
    if body["email"] == "instant@example.com" {
        Json(json!({
            "status": "success",
            "token": "tok-new",
            "user": { "id": "u-1", "email": "instant@example.com" }
        }))
        .into_response()
    } else {
        Json(json!({ "status": "success", "message": "Check your inbox" })).into_response()
    }
}

async fn fake_post(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if bearer(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Post not found" }))).into_response();
    }
    Json(json!({
        "id": id,
        "title": "Small wins",
        "content": "Walked today.",
        "author": { "id": 2, "name": "Lu" },
        "date": "2024-05-01",
        "likes": 3,
        "isLiked": true
    }))
    .into_response()
}

async fn fake_comments(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(token) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    Json(json!({
        "comments": [{
            "id": 1,
            "content": format!("for post {} by {}", query["post_id"], token),
            "author": { "id": "u-2", "name": "Lu" },
            "date": "2024-05-02",
            "likes": 0,
            "isLiked": false
        }],
        "total": 1
    }))
    .into_response()
}

async fn fake_create_comment(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 50,
            "content": body["content"],
            "author": { "id": 1, "name": "Ana" },
            "date": "2024-05-03"
        })),
    )
        .into_response()
}

async fn fake_chat_send(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers).as_deref() != Some("tok-ana") {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({ "data": format!("You said: {}", body["message"].as_str().unwrap_or_default()) }))
        .into_response()
}

async fn fake_chat_history() -> Response {
    Json(json!([
        { "content": "hi", "sender": "user", "timestamp": "2024-05-01T10:00:00Z" },
        { "id": "m2", "content": "hello", "sender": "bot", "timestamp": "2024-05-01T10:00:01Z" }
    ]))
    .into_response()
}

async fn spawn_collaborator() -> String {
    let router = Router::new()
        .route("/api/auth/login", post(fake_login))
        .route("/api/auth/register", post(fake_register))
        .route("/api/auth/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route("/api/posts/{id}", get(fake_post))
        .route("/api/posts/{id}/like", post(|| async { StatusCode::OK }))
        .route(
            "/api/comments",
            get(fake_comments).post(fake_create_comment),
        )
        .route("/chat/send", post(fake_chat_send))
        .route("/chat/history", get(fake_chat_history));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(reqwest::Client::new(), base_url)
}

fn login(email: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: "secret1".to_string(),
    }
}

// --- Auth ---

#[tokio::test]
async fn test_login_success_yields_session() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let session = auth.login(&login("ana@example.com")).await.unwrap();
    assert_eq!(session.token.as_str(), "tok-ana");
    let user = session.user.expect("user returned");
    assert_eq!(user.id, UserId::Number(7));
    assert_eq!(user.name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_login_error_status_carries_server_message() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let err = auth.login(&login("who@example.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_login_error_envelope_is_rejected() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let err = auth.login(&login("locked@example.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref message) if message == "Account locked"));
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let err = auth.login(&login("notoken@example.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[tokio::test]
async fn test_non_json_error_body_uses_generic_message() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let err = auth.login(&login("broken@example.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "Request failed");
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let auth = HttpAuthService::new(client(&format!("http://127.0.0.1:{port}")));
    let err = auth.login(&login("ana@example.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_register_with_and_without_session() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));

    let signed_in = auth
        .register(&RegisterRequest {
            name: "Instant".to_string(),
            email: "instant@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap()
        .expect("token issued");
    let user = signed_in.user.unwrap();
    assert_eq!(user.id, UserId::Text("u-1".to_string()));
    // Name missing from the envelope is filled from the form.
    assert_eq!(user.name.as_deref(), Some("Instant"));

    let pending = auth
        .register(&RegisterRequest {
            name: "Later".to_string(),
            email: "later@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert!(pending.is_none());
}

#[tokio::test]
async fn test_logout_succeeds() {
    let auth = HttpAuthService::new(client(&spawn_collaborator().await));
    auth.logout(&SessionToken::new("tok-ana")).await.unwrap();
}

// --- Posts & comments ---

#[tokio::test]
async fn test_get_post_forwards_token_and_maps_404() {
    let posts = HttpPostsService::new(client(&spawn_collaborator().await));
    let token = SessionToken::new("tok-ana");

    let post = posts.get(&token, 12).await.unwrap().expect("post found");
    assert_eq!(post.id, 12);
    assert!(post.is_liked);
    assert!(!post.is_saved);
    assert_eq!(post.likes, 3);

    assert!(posts.get(&token, 404).await.unwrap().is_none());
    posts.like(&token, 12).await.unwrap();
}

#[tokio::test]
async fn test_comments_list_and_create() {
    let comments = HttpCommentsService::new(client(&spawn_collaborator().await));
    let token = SessionToken::new("tok-ana");

    let page = comments.list(&token, 8).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.comments[0].content, "for post 8 by tok-ana");

    let created = comments
        .create(
            &token,
            &NewComment {
                post_id: 8,
                content: "Same here".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, 50);
    assert_eq!(created.content, "Same here");
    assert_eq!(created.likes, 0);
}

// --- Chat ---

#[tokio::test]
async fn test_chat_send_and_history() {
    let chat = HttpChatService::new(client(&spawn_collaborator().await));
    let token = SessionToken::new("tok-ana");

    let reply = chat.send(&token, "I feel anxious").await.unwrap();
    assert_eq!(reply.data, "You said: I feel anxious");

    let history = chat.history(&token).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].id.is_none());
    assert_eq!(history[1].id.as_deref(), Some("m2"));

    let err = chat.send(&SessionToken::new("other"), "hi").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 403, .. }));
}

// --- Error message extraction ---

#[test]
fn test_error_message_prefers_message_then_error() {
    assert_eq!(
        error_message(r#"{"message":"A","error":"B"}"#).as_deref(),
        Some("A")
    );
    assert_eq!(error_message(r#"{"error":"B"}"#).as_deref(), Some("B"));
    assert_eq!(error_message(r#"{"message":"  ","error":"B"}"#).as_deref(), Some("B"));
    assert_eq!(error_message("plain text"), None);
    assert_eq!(error_message(r#"{"detail":"x"}"#), None);
}

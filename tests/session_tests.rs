use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use calma_portal::{
    AppConfig, AppState,
    auth::Authenticated,
    error::AppError,
    session::{Session, SessionStore, SessionToken, SessionUser, USER_COOKIE, UserId},
};
use cookie::time::Duration;

fn store() -> SessionStore {
    SessionStore::new(&AppConfig::default())
}

fn session(token: &str, user: Option<SessionUser>) -> Session {
    Session {
        token: SessionToken::new(token),
        user,
    }
}

fn ana() -> SessionUser {
    SessionUser {
        id: UserId::Number(7),
        email: "ana@example.com".to_string(),
        name: Some("Ana".to_string()),
    }
}

#[test]
fn test_set_session_then_read_back() {
    let store = store();
    let jar = store.set_session(CookieJar::new(), &session("tok-1", Some(ana())));

    assert_eq!(store.token(&jar), Some(SessionToken::new("tok-1")));
    assert_eq!(store.current_user(&jar), Some(ana()));
}

#[test]
fn test_token_cookie_attributes() {
    let store = store();
    let jar = store.set_session(CookieJar::new(), &session("tok-1", Some(ana())));

    let token = jar.get("authToken").expect("token cookie set");
    assert_eq!(token.path(), Some("/"));
    assert_eq!(token.http_only(), Some(true));
    assert_eq!(token.same_site(), Some(SameSite::Lax));
    assert_eq!(token.max_age(), Some(Duration::days(7)));
    assert_eq!(token.secure(), Some(false));

    let user = jar.get(USER_COOKIE).expect("user cookie set");
    assert_ne!(user.http_only(), Some(true));
}

#[test]
fn test_secure_cookies_follow_config() {
    let store = SessionStore::new(&AppConfig {
        secure_cookies: true,
        session_max_age_days: 30,
        ..AppConfig::default()
    });
    let jar = store.set_session(CookieJar::new(), &session("tok-1", None));

    let token = jar.get("authToken").expect("token cookie set");
    assert_eq!(token.secure(), Some(true));
    assert_eq!(token.max_age(), Some(Duration::days(30)));
}

#[test]
fn test_custom_token_cookie_name() {
    let store = SessionStore::new(&AppConfig {
        token_cookie: "calmaSession".to_string(),
        ..AppConfig::default()
    });
    let jar = store.set_session(CookieJar::new(), &session("tok-1", None));

    assert_eq!(store.token_cookie(), "calmaSession");
    assert!(jar.get("calmaSession").is_some());
    assert!(jar.get("authToken").is_none());
}

#[test]
fn test_new_session_without_user_drops_stale_record() {
    let store = store();
    let jar = store.set_session(CookieJar::new(), &session("old", Some(ana())));
    let jar = store.set_session(jar, &session("new", None));

    assert_eq!(store.token(&jar), Some(SessionToken::new("new")));
    assert_eq!(store.current_user(&jar), None);
}

#[test]
fn test_clear_session_removes_everything() {
    let store = store();
    let jar = store.set_session(CookieJar::new(), &session("tok-1", Some(ana())));
    let jar = store.clear_session(jar);

    assert_eq!(store.token(&jar), None);
    assert_eq!(store.current_user(&jar), None);

    // Clearing an empty jar is harmless.
    let jar = store.clear_session(CookieJar::new());
    assert_eq!(store.token(&jar), None);
}

#[test]
fn test_blank_token_reads_as_absent() {
    let store = store();
    let jar = CookieJar::new().add(Cookie::new("authToken", "   "));
    assert_eq!(store.token(&jar), None);
}

#[test]
fn test_user_record_needs_a_token() {
    let store = store();
    let jar = store.set_session(CookieJar::new(), &session("tok-1", Some(ana())));
    let jar = jar.remove(Cookie::build("authToken").path("/"));

    assert!(jar.get(USER_COOKIE).is_some());
    assert_eq!(store.current_user(&jar), None);
}

#[test]
fn test_garbage_user_cookie_reads_as_no_user() {
    let store = store();
    let jar = CookieJar::new()
        .add(Cookie::new("authToken", "tok-1"))
        .add(Cookie::new(USER_COOKIE, "not-base64-json!"));

    assert_eq!(store.token(&jar), Some(SessionToken::new("tok-1")));
    assert_eq!(store.current_user(&jar), None);
}

#[test]
fn test_string_user_ids_survive_the_cookie() {
    let store = store();
    let user = SessionUser {
        id: UserId::Text("u-abc".to_string()),
        email: "b@example.com".to_string(),
        name: None,
    };
    let jar = store.set_session(CookieJar::new(), &session("tok-1", Some(user.clone())));
    assert_eq!(store.current_user(&jar), Some(user));
}

#[test]
fn test_token_debug_is_redacted() {
    let token = SessionToken::new("super-secret-value");
    assert!(!format!("{token:?}").contains("super-secret-value"));
    assert_eq!(token.as_str(), "super-secret-value");
}

// --- Authenticated extractor ---

#[tokio::test]
async fn test_authenticated_reads_token_cookie() {
    let state = AppState::new(AppConfig::default());
    let (mut parts, _) = Request::builder()
        .uri("/api/posts")
        .header(header::COOKIE, "authToken=tok-9; other=1")
        .body(())
        .unwrap()
        .into_parts();

    let session = Authenticated::from_request_parts(&mut parts, &state)
        .await
        .expect("token present");
    assert_eq!(session.token.as_str(), "tok-9");
}

#[tokio::test]
async fn test_authenticated_rejects_missing_cookie() {
    let state = AppState::new(AppConfig::default());
    let (mut parts, _) = Request::builder()
        .uri("/api/posts")
        .body(())
        .unwrap()
        .into_parts();

    let result = Authenticated::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

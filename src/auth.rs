use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use crate::{
    error::AppError,
    session::{SessionStore, SessionToken},
};

/// Authenticated
///
/// The session token of the current request, resolved from the token cookie.
/// Handlers that relay calls to collaborators take it as an argument and forward the
/// token; they never look inside it.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: SessionToken,
}

/// Authenticated Extractor Implementation
///
/// Reads the cookie through the shared `SessionStore`, the same read path the access
/// gate uses. An absent, empty or unparsable token cookie rejects the request with
/// 401 before the handler runs.
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        sessions
            .token(&jar)
            .map(|token| Authenticated { token })
            .ok_or(AppError::Unauthorized)
    }
}

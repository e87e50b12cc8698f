use std::fmt;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::time::Duration;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::config::AppConfig;

/// Name of the cookie holding the encoded user record.
pub const USER_COOKIE: &str = "userData";

/// SessionToken
///
/// The opaque credential issued by the auth service. Its shape is never inspected;
/// presence alone means "authenticated". `Debug` redacts the value so tokens do not
/// end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// UserId
///
/// The auth service hands out numeric ids; other collaborators use strings.
/// Both are accepted and echoed back in the form they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// SessionUser
///
/// The minimal identity record kept next to the token so pages can greet the user
/// without a network round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Session
///
/// What a successful login or registration yields: a token, and the user record
/// when the auth service returned one.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: Option<SessionUser>,
}

/// SessionStore
///
/// The single persistence path for client-held session state. Every write goes
/// through `set_session`/`clear_session`, every read through `token`/`current_user`.
/// Built once from `AppConfig` and shared through the application state.
#[derive(Clone, Debug)]
pub struct SessionStore {
    token_cookie: String,
    max_age: Duration,
    secure: bool,
}

impl SessionStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            token_cookie: config.token_cookie.clone(),
            max_age: Duration::days(config.session_max_age_days),
            secure: config.secure_cookies,
        }
    }

    pub fn token_cookie(&self) -> &str {
        &self.token_cookie
    }

    /// set_session
    ///
    /// Persists the token and, when present, the user record. The token cookie is
    /// `HttpOnly`; the user cookie is readable by page scripts.
    pub fn set_session(&self, jar: CookieJar, session: &Session) -> CookieJar {
        let token = Cookie::build((self.token_cookie.clone(), session.token.as_str().to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age);
        let jar = jar.add(token);

        match session.user.as_ref().and_then(encode_user) {
            Some(encoded) => jar.add(
                Cookie::build((USER_COOKIE, encoded))
                    .path("/")
                    .same_site(SameSite::Lax)
                    .secure(self.secure)
                    .max_age(self.max_age),
            ),
            // A stale record from a previous user must not outlive the new token.
            None => jar.remove(Cookie::build(USER_COOKIE).path("/")),
        }
    }

    /// clear_session
    ///
    /// Removes both cookies. Safe to call when nothing is set.
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.token_cookie.clone()).path("/"))
            .remove(Cookie::build(USER_COOKIE).path("/"))
    }

    /// Returns the token if the cookie is present and non-empty.
    pub fn token(&self, jar: &CookieJar) -> Option<SessionToken> {
        jar.get(&self.token_cookie)
            .map(Cookie::value)
            .filter(|value| !value.trim().is_empty())
            .map(SessionToken::new)
    }

    /// current_user
    ///
    /// Decodes the persisted user record. Without a token there is no user, even if
    /// an old record cookie lingers. Anything undecodable reads as "no user".
    pub fn current_user(&self, jar: &CookieJar) -> Option<SessionUser> {
        self.token(jar)?;
        let raw = jar.get(USER_COOKIE)?;
        decode_user(raw.value())
    }
}

fn encode_user(user: &SessionUser) -> Option<String> {
    match serde_json::to_vec(user) {
        Ok(bytes) => Some(URL_SAFE_NO_PAD.encode(bytes)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode session user; cookie not written");
            None
        }
    }
}

fn decode_user(raw: &str) -> Option<SessionUser> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

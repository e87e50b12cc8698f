//! Clients for the external collaborators.
//!
//! Each collaborator is a trait (`AuthService`, `PostsService`, `CommentsService`,
//! `ChatService`) with an HTTP implementation built on the shared `ApiClient`.
//! Handlers only see `Arc<dyn Trait>`, so tests can swap in fakes.

use reqwest::{RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{error::ApiError, session::SessionToken};

pub mod auth;
pub mod chat;
pub mod comments;
pub mod posts;

pub use auth::{AuthService, AuthState, HttpAuthService, MockAuthService};
pub use chat::{ChatService, ChatState, HttpChatService};
pub use comments::{CommentsService, CommentsState, HttpCommentsService};
pub use posts::{HttpPostsService, PostsService, PostsState};

const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// ApiClient
///
/// Thin JSON-over-HTTP wrapper shared by the collaborator clients. No retries and
/// no timeouts beyond reqwest's defaults: a failure goes straight back to the caller.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(builder: RequestBuilder, token: Option<&SessionToken>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        let builder = Self::authorize(self.http.get(self.url(path)), token);
        let response = send(builder).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = Self::authorize(self.http.post(self.url(path)).json(body), token);
        let response = send(builder).await?;
        decode(response).await
    }

    /// POST whose response body is irrelevant (likes, saves, logout).
    pub async fn post_unit<B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let builder = Self::authorize(self.http.post(self.url(path)).json(body), token);
        send(builder).await.map(|_| ())
    }
}

/// Sends the request and turns any non-2xx into `ApiError::Status`.
async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
    tracing::warn!(status = status.as_u16(), %message, "Collaborator returned an error status");

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

/// error_message
///
/// Best-effort extraction of a human-readable reason from an error body:
/// `message` first, then `error`. Non-JSON bodies yield nothing.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

use std::sync::Arc;

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::ApiError,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, RecoverPasswordRequest,
        RegisterRequest, ResetPasswordRequest,
    },
    session::{Session, SessionToken, SessionUser},
};

// 1. AuthService Contract
/// AuthService
///
/// The external authentication collaborator. Implementations only talk to the
/// service; persisting the resulting session is the caller's job (see
/// `SessionStore`), so a failed call can never leave a half-written session behind.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges credentials for a session. A successful response without a token
    /// is a failure.
    async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError>;

    /// Creates an account. Returns a session only when the service signed the new
    /// user in straight away.
    async fn register(&self, request: &RegisterRequest) -> Result<Option<Session>, ApiError>;

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError>;

    /// Asks the service to e-mail a password reset link.
    async fn recover_password(&self, request: &RecoverPasswordRequest) -> Result<(), ApiError>;

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError>;

    async fn change_password(
        &self,
        token: &SessionToken,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;
}

/// AuthState
///
/// The shared handle stored in the application state.
pub type AuthState = Arc<dyn AuthService>;

// 2. The Real Implementation
/// HttpAuthService
///
/// Talks to the auth endpoints under `/api/auth` on the configured backend.
#[derive(Clone)]
pub struct HttpAuthService {
    client: ApiClient,
}

impl HttpAuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// Converts the auth envelope into a session, treating `status: "error"` as a
/// rejection even though it arrived with a 2xx.
fn into_session(response: AuthResponse) -> Result<Option<Session>, ApiError> {
    if response.status.as_deref() == Some("error") {
        let message = response
            .message
            .or(response.error)
            .unwrap_or_else(|| "Authentication failed".to_string());
        return Err(ApiError::Rejected(message));
    }

    let user = response.user.map(|record| SessionUser {
        id: record.id,
        email: record.email,
        name: record.name,
    });

    Ok(response
        .token
        .filter(|token| !token.trim().is_empty())
        .map(|token| Session {
            token: SessionToken::new(token),
            user,
        }))
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let response: AuthResponse = self
            .client
            .post_json("/api/auth/login", request, None)
            .await?;
        into_session(response)?.ok_or(ApiError::MissingToken)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<Session>, ApiError> {
        let response: AuthResponse = self
            .client
            .post_json("/api/auth/register", request, None)
            .await?;
        let session = into_session(response)?;

        // The register envelope may omit the display name; keep the one just entered.
        Ok(session.map(|mut session| {
            if let Some(user) = session.user.as_mut() {
                user.name.get_or_insert_with(|| request.name.clone());
            }
            session
        }))
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        self.client
            .post_unit("/api/auth/logout", &serde_json::json!({}), Some(token))
            .await
    }

    async fn recover_password(&self, request: &RecoverPasswordRequest) -> Result<(), ApiError> {
        self.client
            .post_unit("/api/auth/recover-password", request, None)
            .await
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.client
            .post_unit("/api/auth/reset-password", request, None)
            .await
    }

    async fn change_password(
        &self,
        token: &SessionToken,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.client
            .post_unit("/api/auth/change-password", request, Some(token))
            .await
    }
}

// 3. The Mock Implementation (For Tests and Offline Runs)
/// MockAuthService
///
/// Accepts any credentials and issues a fixed token, or rejects everything when
/// `should_fail` is set. Lets the session routes be exercised without a backend.
#[derive(Clone)]
pub struct MockAuthService {
    /// When true, every call fails with a 401.
    pub should_fail: bool,
    /// When false, registration succeeds without signing the user in.
    pub register_signs_in: bool,
}

pub const MOCK_TOKEN: &str = "mock-session-token";

impl MockAuthService {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            register_signs_in: true,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            register_signs_in: true,
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.should_fail {
            return Err(ApiError::Status {
                status: 401,
                message: "Invalid credentials".to_string(),
            });
        }
        Ok(())
    }

    fn session_for(email: &str, name: Option<String>) -> Session {
        Session {
            token: SessionToken::new(MOCK_TOKEN),
            user: Some(SessionUser {
                id: crate::session::UserId::Number(1),
                email: email.to_string(),
                name,
            }),
        }
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        self.check()?;
        Ok(Self::session_for(&request.email, None))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<Session>, ApiError> {
        self.check()?;
        Ok(self
            .register_signs_in
            .then(|| Self::session_for(&request.email, Some(request.name.clone()))))
    }

    async fn logout(&self, _token: &SessionToken) -> Result<(), ApiError> {
        self.check()
    }

    async fn recover_password(&self, _request: &RecoverPasswordRequest) -> Result<(), ApiError> {
        self.check()
    }

    async fn reset_password(&self, _request: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.check()
    }

    async fn change_password(
        &self,
        _token: &SessionToken,
        _request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.check()
    }
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    assessment::{self, AssessmentResult, Question},
    auth::Authenticated,
    error::AppError,
    models::{
        AssessmentSubmission, ChangePasswordForm, ChatMessage, ChatReply, Comment, CommentPage,
        CommentQuery, LoginRequest, NewComment, NewPost, Post, PostPage, RecoverPasswordRequest,
        RegisterForm, RegisterResponse, ResetPasswordForm, SendMessageRequest, SessionResponse,
    },
    pages::{Page, PageView},
    validation::Validate,
};

// --- Pages ---

/// render_page
///
/// [Gated Route] Describes the requested page. By the time this runs the access gate
/// has already let the request through, so it only resolves the page and the
/// signed-in user (from cookies, no network). Also serves as the router fallback,
/// which covers trailing-slash spellings and answers 404 for everything else.
pub async fn render_page(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Json<PageView>, AppError> {
    let page = Page::from_path(uri.path()).ok_or(AppError::NotFound)?;
    let user = state.sessions.current_user(&jar);
    Ok(Json(PageView::new(page, user)))
}

// --- Session ---

/// login
///
/// [Public Route] Signs the user in through the auth service and persists the
/// session cookies. On any failure the cookies are left exactly as they were.
#[utoipa::path(
    post,
    path = "/api/session/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Missing field"),
        (status = 401, description = "Rejected by the auth service")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    payload.validate()?;
    let session = state.auth.login(&payload).await?;

    tracing::info!(
        user_id = ?session.user.as_ref().map(|user| user.id.to_string()),
        "User signed in"
    );

    let assessment_complete = state.assessment.is_complete(&jar);
    let jar = state.sessions.set_session(jar, &session);

    Ok((
        jar,
        Json(SessionResponse {
            user: session.user,
            assessment_complete,
        }),
    ))
}

/// register
///
/// [Public Route] Creates an account. Password confirmation is checked locally first.
/// When the auth service also issues a token the user is signed in immediately.
#[utoipa::path(
    post,
    path = "/api/session/register",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), AppError> {
    form.validate()?;
    let session = state.auth.register(&form.into()).await?;

    let (jar, response) = match session {
        Some(session) => (
            state.sessions.set_session(jar, &session),
            RegisterResponse {
                signed_in: true,
                user: session.user,
            },
        ),
        None => (
            jar,
            RegisterResponse {
                signed_in: false,
                user: None,
            },
        ),
    };

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// logout
///
/// [Public Route] Tells the auth service, then clears the local session whatever it
/// answered. Also forgets the assessment flag unless configured otherwise.
#[utoipa::path(
    post,
    path = "/api/session/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(token) = state.sessions.token(&jar) {
        if let Err(e) = state.auth.logout(&token).await {
            tracing::warn!(error = %e, "Logout call failed; clearing the local session anyway");
        }
    }

    let mut jar = state.sessions.clear_session(jar);
    if state.config.reset_assessment_on_logout {
        jar = state.assessment.clear(jar);
    }

    (jar, StatusCode::NO_CONTENT)
}

/// get_session
///
/// [Public Route] Returns the persisted session without contacting the auth service.
#[utoipa::path(
    get,
    path = "/api/session/me",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, AppError> {
    state.sessions.token(&jar).ok_or(AppError::Unauthorized)?;

    Ok(Json(SessionResponse {
        user: state.sessions.current_user(&jar),
        assessment_complete: state.assessment.is_complete(&jar),
    }))
}

#[utoipa::path(
    post,
    path = "/api/session/recover-password",
    request_body = RecoverPasswordRequest,
    responses((status = 202, description = "Recovery e-mail requested"))
)]
pub async fn recover_password(
    State(state): State<AppState>,
    Json(payload): Json<RecoverPasswordRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state.auth.recover_password(&payload).await?;
    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    post,
    path = "/api/session/reset-password",
    request_body = ResetPasswordForm,
    responses(
        (status = 204, description = "Password reset"),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<StatusCode, AppError> {
    form.validate()?;
    state.auth.reset_password(&form.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// change_password
///
/// [Authenticated Route] Changes the signed-in user's password.
#[utoipa::path(
    post,
    path = "/api/session/change-password",
    request_body = ChangePasswordForm,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn change_password(
    session: Authenticated,
    State(state): State<AppState>,
    Json(form): Json<ChangePasswordForm>,
) -> Result<StatusCode, AppError> {
    form.validate()?;
    state.auth.change_password(&session.token, &form.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Assessment ---

#[utoipa::path(
    get,
    path = "/api/assessment/questions",
    responses((status = 200, description = "Questionnaire", body = [Question]))
)]
pub async fn get_questions() -> Json<Vec<Question>> {
    Json(assessment::questions())
}

/// submit_assessment
///
/// [Authenticated Route] Scores a complete answer set and sets the completion flag.
/// An incomplete or out-of-range set is rejected and leaves the flag untouched.
#[utoipa::path(
    post,
    path = "/api/assessment/submit",
    request_body = AssessmentSubmission,
    responses(
        (status = 200, description = "Scored", body = AssessmentResult),
        (status = 400, description = "Incomplete answers")
    )
)]
pub async fn submit_assessment(
    _session: Authenticated,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(submission): Json<AssessmentSubmission>,
) -> Result<(CookieJar, Json<AssessmentResult>), AppError> {
    submission.validate()?;
    let result = assessment::score(&submission.answers)?;

    tracing::info!(level = ?result.level, "Assessment completed");

    let jar = state.assessment.mark_complete(jar);
    Ok((jar, Json(result)))
}

// --- Posts ---

#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, description = "Posts", body = PostPage))
)]
pub async fn list_posts(
    session: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<PostPage>, AppError> {
    Ok(Json(state.posts.list(&session.token).await?))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    session: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, AppError> {
    state
        .posts
        .get(&session.token, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = NewPost,
    responses((status = 201, description = "Created", body = Post))
)]
pub async fn create_post(
    session: Authenticated,
    State(state): State<AppState>,
    Json(post): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    post.validate()?;
    let created = state.posts.create(&session.token, &post).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 204, description = "Like toggled"))
)]
pub async fn like_post(
    session: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.posts.like(&session.token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/save",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 204, description = "Save toggled"))
)]
pub async fn save_post(
    session: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.posts.save(&session.token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Comments ---

#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentQuery),
    responses((status = 200, description = "Comments for a post", body = CommentPage))
)]
pub async fn list_comments(
    session: Authenticated,
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<CommentPage>, AppError> {
    Ok(Json(state.comments.list(&session.token, query.post_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = NewComment,
    responses((status = 201, description = "Comment Added", body = Comment))
)]
pub async fn create_comment(
    session: Authenticated,
    State(state): State<AppState>,
    Json(comment): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    comment.validate()?;
    let created = state.comments.create(&session.token, &comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/like",
    params(("id" = i64, Path, description = "Comment ID")),
    responses((status = 204, description = "Like toggled"))
)]
pub async fn like_comment(
    session: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.comments.like(&session.token, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Chat ---

#[utoipa::path(
    post,
    path = "/api/chat/send",
    request_body = SendMessageRequest,
    responses((status = 200, description = "Bot reply", body = ChatReply))
)]
pub async fn send_chat_message(
    session: Authenticated,
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    payload.validate()?;
    Ok(Json(state.chat.send(&session.token, &payload.message).await?))
}

#[utoipa::path(
    get,
    path = "/api/chat/history",
    responses((status = 200, description = "Chat history", body = [ChatMessage]))
)]
pub async fn get_chat_history(
    session: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(state.chat.history(&session.token).await?))
}

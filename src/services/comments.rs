use std::sync::Arc;

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::ApiError,
    models::{Comment, CommentPage, NewComment},
    session::SessionToken,
};

/// CommentsService
///
/// The comments collaborator. Comments are always listed per post.
#[async_trait]
pub trait CommentsService: Send + Sync {
    async fn list(&self, token: &SessionToken, post_id: i64) -> Result<CommentPage, ApiError>;

    async fn create(&self, token: &SessionToken, comment: &NewComment)
    -> Result<Comment, ApiError>;

    /// Toggles the caller's like on the comment.
    async fn like(&self, token: &SessionToken, id: i64) -> Result<(), ApiError>;
}

pub type CommentsState = Arc<dyn CommentsService>;

#[derive(Clone)]
pub struct HttpCommentsService {
    client: ApiClient,
}

impl HttpCommentsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentsService for HttpCommentsService {
    async fn list(&self, token: &SessionToken, post_id: i64) -> Result<CommentPage, ApiError> {
        self.client
            .get_json(&format!("/api/comments?post_id={post_id}"), Some(token))
            .await
    }

    async fn create(
        &self,
        token: &SessionToken,
        comment: &NewComment,
    ) -> Result<Comment, ApiError> {
        self.client
            .post_json("/api/comments", comment, Some(token))
            .await
    }

    async fn like(&self, token: &SessionToken, id: i64) -> Result<(), ApiError> {
        self.client
            .post_unit(
                &format!("/api/comments/{id}/like"),
                &serde_json::json!({}),
                Some(token),
            )
            .await
    }
}

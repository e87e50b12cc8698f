use std::sync::Arc;

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::ApiError,
    models::{NewPost, Post, PostPage},
    session::SessionToken,
};

/// PostsService
///
/// The posts collaborator behind the experiences feed.
#[async_trait]
pub trait PostsService: Send + Sync {
    async fn list(&self, token: &SessionToken) -> Result<PostPage, ApiError>;

    /// `Ok(None)` when the post does not exist.
    async fn get(&self, token: &SessionToken, id: i64) -> Result<Option<Post>, ApiError>;

    async fn create(&self, token: &SessionToken, post: &NewPost) -> Result<Post, ApiError>;

    /// Toggles the caller's like on the post.
    async fn like(&self, token: &SessionToken, id: i64) -> Result<(), ApiError>;

    /// Toggles the caller's bookmark on the post.
    async fn save(&self, token: &SessionToken, id: i64) -> Result<(), ApiError>;
}

pub type PostsState = Arc<dyn PostsService>;

#[derive(Clone)]
pub struct HttpPostsService {
    client: ApiClient,
}

impl HttpPostsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostsService for HttpPostsService {
    async fn list(&self, token: &SessionToken) -> Result<PostPage, ApiError> {
        self.client.get_json("/api/posts", Some(token)).await
    }

    async fn get(&self, token: &SessionToken, id: i64) -> Result<Option<Post>, ApiError> {
        match self
            .client
            .get_json(&format!("/api/posts/{id}"), Some(token))
            .await
        {
            Ok(post) => Ok(Some(post)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, token: &SessionToken, post: &NewPost) -> Result<Post, ApiError> {
        self.client.post_json("/api/posts", post, Some(token)).await
    }

    async fn like(&self, token: &SessionToken, id: i64) -> Result<(), ApiError> {
        self.client
            .post_unit(&format!("/api/posts/{id}/like"), &serde_json::json!({}), Some(token))
            .await
    }

    async fn save(&self, token: &SessionToken, id: i64) -> Result<(), ApiError> {
        self.client
            .post_unit(&format!("/api/posts/{id}/save"), &serde_json::json!({}), Some(token))
            .await
    }
}

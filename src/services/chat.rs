use std::sync::Arc;

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::ApiError,
    models::{ChatMessage, ChatReply, SendMessageRequest},
    session::SessionToken,
};

/// ChatService
///
/// The support chat collaborator. It lives on its own host (`CHAT_URL`).
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send(&self, token: &SessionToken, message: &str) -> Result<ChatReply, ApiError>;

    async fn history(&self, token: &SessionToken) -> Result<Vec<ChatMessage>, ApiError>;
}

pub type ChatState = Arc<dyn ChatService>;

#[derive(Clone)]
pub struct HttpChatService {
    client: ApiClient,
}

impl HttpChatService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send(&self, token: &SessionToken, message: &str) -> Result<ChatReply, ApiError> {
        let request = SendMessageRequest {
            message: message.to_string(),
        };
        self.client
            .post_json("/chat/send", &request, Some(token))
            .await
    }

    async fn history(&self, token: &SessionToken) -> Result<Vec<ChatMessage>, ApiError> {
        self.client.get_json("/chat/history", Some(token)).await
    }
}

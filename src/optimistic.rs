//! Optimistic view state for the posts feed and comment threads.
//!
//! Likes, saves and new comments are applied locally before the collaborator
//! answers. Each change is split in two steps: `begin_*` applies it and returns a
//! snapshot, `settle_*` either keeps it or puts the snapshot back. The async
//! helpers (`like`, `save`, `submit`) run both steps around the service call.
//!
//! `PostFeed` and `CommentThread` are library surface for page clients holding view
//! state; the HTTP handlers relay single calls and do not use them.

use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Comment, NewComment, Post},
    services::{CommentsService, PostsService},
    session::SessionToken,
};

/// Reaction
///
/// Like counter plus whether the current user is one of the likers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reaction {
    pub likes: u32,
    pub is_liked: bool,
}

impl Reaction {
    /// Liking adds one, un-liking takes one away.
    pub fn toggled(self) -> Self {
        if self.is_liked {
            Self {
                likes: self.likes.saturating_sub(1),
                is_liked: false,
            }
        } else {
            Self {
                likes: self.likes.saturating_add(1),
                is_liked: true,
            }
        }
    }
}

/// Anything carrying a `Reaction`.
pub trait Reactive {
    fn id(&self) -> i64;
    fn reaction(&self) -> Reaction;
    fn set_reaction(&mut self, reaction: Reaction);
}

impl Reactive for Comment {
    fn id(&self) -> i64 {
        self.id
    }

    fn reaction(&self) -> Reaction {
        Reaction {
            likes: self.likes,
            is_liked: self.is_liked,
        }
    }

    fn set_reaction(&mut self, reaction: Reaction) {
        self.likes = reaction.likes;
        self.is_liked = reaction.is_liked;
    }
}

impl Reactive for Post {
    fn id(&self) -> i64 {
        self.id
    }

    fn reaction(&self) -> Reaction {
        Reaction {
            likes: self.likes,
            is_liked: self.is_liked,
        }
    }

    fn set_reaction(&mut self, reaction: Reaction) {
        self.likes = reaction.likes;
        self.is_liked = reaction.is_liked;
    }
}

/// PendingLike
///
/// The reaction an item had before an optimistic toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an optimistic like must be settled"]
pub struct PendingLike {
    pub id: i64,
    pub before: Reaction,
}

/// PendingSave
///
/// The saved state a post had before an optimistic toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an optimistic save must be settled"]
pub struct PendingSave {
    pub id: i64,
    pub before: bool,
}

fn begin_like<T: Reactive>(items: &mut [T], id: i64) -> Option<PendingLike> {
    let item = items.iter_mut().find(|item| item.id() == id)?;
    let before = item.reaction();
    item.set_reaction(before.toggled());
    Some(PendingLike { id, before })
}

fn settle_like<T: Reactive, E>(items: &mut [T], pending: PendingLike, outcome: &Result<(), E>) {
    if outcome.is_ok() {
        return;
    }
    if let Some(item) = items.iter_mut().find(|item| item.id() == pending.id) {
        item.set_reaction(pending.before);
    }
}

/// A comment shown in the thread while the comments service has not confirmed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComment {
    pub local_id: Uuid,
    pub content: String,
}

/// CommentThread
///
/// The comments under one post as the reader sees them.
#[derive(Debug, Clone)]
pub struct CommentThread {
    post_id: i64,
    comments: Vec<Comment>,
    pending: Vec<PendingComment>,
}

impl CommentThread {
    pub fn new(post_id: i64, comments: Vec<Comment>) -> Self {
        Self {
            post_id,
            comments,
            pending: Vec::new(),
        }
    }

    pub async fn load(
        service: &dyn CommentsService,
        token: &SessionToken,
        post_id: i64,
    ) -> Result<Self, ApiError> {
        let page = service.list(token, post_id).await?;
        Ok(Self::new(post_id, page.comments))
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn pending(&self) -> &[PendingComment] {
        &self.pending
    }

    pub fn get(&self, id: i64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// Toggles the like locally. `None` if the comment is not in this thread.
    pub fn begin_like(&mut self, id: i64) -> Option<PendingLike> {
        begin_like(&mut self.comments, id)
    }

    /// Keeps the toggle on success; restores the exact previous count and flag on
    /// failure.
    pub fn settle_like<E>(&mut self, pending: PendingLike, outcome: &Result<(), E>) {
        settle_like(&mut self.comments, pending, outcome)
    }

    /// like
    ///
    /// Optimistic like round-trip. Unknown ids are left alone and never reach the
    /// service.
    pub async fn like(
        &mut self,
        service: &dyn CommentsService,
        token: &SessionToken,
        id: i64,
    ) -> Result<(), ApiError> {
        let Some(pending) = self.begin_like(id) else {
            return Ok(());
        };
        let outcome = service.like(token, id).await;
        self.settle_like(pending, &outcome);
        if let Err(e) = &outcome {
            tracing::debug!(comment_id = id, error = %e, "Reverted optimistic comment like");
        }
        outcome
    }

    /// Shows `content` immediately under a local id.
    pub fn begin_submit(&mut self, content: impl Into<String>) -> Uuid {
        let local_id = Uuid::new_v4();
        self.pending.push(PendingComment {
            local_id,
            content: content.into(),
        });
        local_id
    }

    /// Replaces the pending entry with the confirmed comment, or drops it on failure.
    pub fn settle_submit(
        &mut self,
        local_id: Uuid,
        outcome: Result<Comment, ApiError>,
    ) -> Result<(), ApiError> {
        self.pending.retain(|pending| pending.local_id != local_id);
        let comment = outcome?;
        self.comments.push(comment);
        Ok(())
    }

    pub async fn submit(
        &mut self,
        service: &dyn CommentsService,
        token: &SessionToken,
        content: impl Into<String>,
    ) -> Result<(), ApiError> {
        let content = content.into();
        let local_id = self.begin_submit(content.clone());
        let request = NewComment {
            post_id: self.post_id,
            content,
        };
        let outcome = service.create(token, &request).await;
        self.settle_submit(local_id, outcome)
    }
}

/// PostFeed
///
/// The experiences feed with optimistic likes and saves.
#[derive(Debug, Clone, Default)]
pub struct PostFeed {
    posts: Vec<Post>,
}

impl PostFeed {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub async fn load(service: &dyn PostsService, token: &SessionToken) -> Result<Self, ApiError> {
        let page = service.list(token).await?;
        Ok(Self::new(page.posts))
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn begin_like(&mut self, id: i64) -> Option<PendingLike> {
        begin_like(&mut self.posts, id)
    }

    pub fn settle_like<E>(&mut self, pending: PendingLike, outcome: &Result<(), E>) {
        settle_like(&mut self.posts, pending, outcome)
    }

    pub async fn like(
        &mut self,
        service: &dyn PostsService,
        token: &SessionToken,
        id: i64,
    ) -> Result<(), ApiError> {
        let Some(pending) = self.begin_like(id) else {
            return Ok(());
        };
        let outcome = service.like(token, id).await;
        self.settle_like(pending, &outcome);
        outcome
    }

    pub fn begin_save(&mut self, id: i64) -> Option<PendingSave> {
        let post = self.posts.iter_mut().find(|post| post.id == id)?;
        let before = post.is_saved;
        post.is_saved = !before;
        Some(PendingSave { id, before })
    }

    pub fn settle_save<E>(&mut self, pending: PendingSave, outcome: &Result<(), E>) {
        if outcome.is_ok() {
            return;
        }
        if let Some(post) = self.posts.iter_mut().find(|post| post.id == pending.id) {
            post.is_saved = pending.before;
        }
    }

    pub async fn save(
        &mut self,
        service: &dyn PostsService,
        token: &SessionToken,
        id: i64,
    ) -> Result<(), ApiError> {
        let Some(pending) = self.begin_save(id) else {
            return Ok(());
        };
        let outcome = service.save(token, id).await;
        self.settle_save(pending, &outcome);
        outcome
    }
}

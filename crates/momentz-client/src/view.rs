//! The render model: what the UI is currently showing.
//!
//! All optimistic changes and rollbacks are applied here. The lock is a
//! plain `std::sync::Mutex` and is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use momentz_shared::{Comment, CommentId, Post, PostId, User, UserId};

use crate::notify::Toasts;

/// Like icon and counter of one post card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: u64,
}

impl LikeState {
    /// The optimistic guess after one toggle.
    pub fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                count: self.count.saturating_add(1),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub post: Post,
    pub like: LikeState,
    /// Disabled while a like toggle for this post is in flight.
    pub like_pending: bool,
}

impl PostCard {
    pub fn new(post: Post) -> Self {
        let like = LikeState {
            liked: post.liked_by_current_user,
            count: post.likes_count,
        };
        Self {
            post,
            like,
            like_pending: false,
        }
    }

    pub fn id(&self) -> PostId {
        self.post.id
    }
}

/// One rendered comment. Provisional lines have a `local_id` and no `id`
/// until the server confirms them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub id: Option<CommentId>,
    pub local_id: Option<Uuid>,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentLine {
    pub fn provisional(author_username: &str, content: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            local_id: Some(Uuid::new_v4()),
            author_username: author_username.to_string(),
            content: content.to_string(),
            created_at: now,
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.id.is_none()
    }
}

impl From<Comment> for CommentLine {
    fn from(c: Comment) -> Self {
        Self {
            id: Some(c.id),
            local_id: None,
            author_username: c.author_username,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowButton {
    #[default]
    Idle,
    Pending,
    Following,
}

/// Which list `FeedState::posts` currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grid {
    Feed,
    User(String),
}

#[derive(Debug, Default)]
pub struct FeedState {
    /// Feed or profile grid, in server order.
    pub posts: Vec<PostCard>,
    pub grid: Option<Grid>,
    /// Post currently opened in the detail view.
    pub open_post: Option<PostId>,
    pub comments: HashMap<PostId, Vec<CommentLine>>,
    pub follow_buttons: HashMap<UserId, FollowButton>,
    pub profile: Option<User>,
    pub suggestions: Vec<User>,
    /// Blocking indicator for create/delete/profile saves.
    pub loading: bool,
    pub toasts: Toasts,
    /// Bumped on every navigation.
    pub epoch: u64,
}

impl FeedState {
    pub fn card(&self, id: PostId) -> Option<&PostCard> {
        self.posts.iter().find(|c| c.id() == id)
    }

    pub fn card_mut(&mut self, id: PostId) -> Option<&mut PostCard> {
        self.posts.iter_mut().find(|c| c.id() == id)
    }

    /// Replace the grid with fresh server data.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts.into_iter().map(PostCard::new).collect();
    }

    /// Insert or refresh a single post, keeping its position if present.
    pub fn upsert_post(&mut self, post: Post) {
        match self.card_mut(post.id) {
            Some(card) => *card = PostCard::new(post),
            None => self.posts.push(PostCard::new(post)),
        }
    }

    pub fn follow_button(&self, user: UserId) -> FollowButton {
        self.follow_buttons.get(&user).copied().unwrap_or_default()
    }
}

/// Shared handle to the render model.
#[derive(Debug, Clone, Default)]
pub struct ViewStore {
    inner: Arc<Mutex<FeedState>>,
}

impl ViewStore {
    pub fn new(state: FeedState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut FeedState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Run `f` with read access, for rendering or assertions.
    pub fn read<R>(&self, f: impl FnOnce(&FeedState) -> R) -> R {
        f(&self.lock())
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Leave the current view. Cached entities are dropped and anything
    /// still in flight from the old view will find the epoch moved on.
    pub fn navigate(&self) -> u64 {
        let mut state = self.lock();
        state.epoch += 1;
        state.posts.clear();
        state.grid = None;
        state.open_post = None;
        state.comments.clear();
        state.follow_buttons.clear();
        state.suggestions.clear();
        state.loading = false;
        tracing::debug!(epoch = state.epoch, "View changed");
        state.epoch
    }
}

//! Reads. No optimism here: the view changes only when data arrives.

use std::sync::Arc;

use tracing::{debug, warn};

use momentz_shared::PostId;

use crate::coordinator::Coordinator;
use crate::error::ApiError;
use crate::events::Outcome;
use crate::notify::notice;
use crate::session::Session;
use crate::view::{CommentLine, FeedState, Grid};

struct ReadOrigin {
    epoch: u64,
    issuer: Option<Arc<Session>>,
}

impl Coordinator {
    pub(crate) async fn load_feed(&self) -> Outcome {
        let origin = self.origin();
        let size = self.options().feed_page_size;
        let result = self.api().feed(0, size).await;

        self.apply_read(origin, result, Some(notice::FEED_FAILED), |state, posts| {
            debug!(count = posts.len(), "Feed loaded");
            state.grid = Some(Grid::Feed);
            state.set_posts(posts);
        })
    }

    /// Post detail: the post itself, then its comments.
    pub(crate) async fn open_post(&self, post: PostId) -> Outcome {
        let origin = self.origin();
        let result = match self.api().post(post).await {
            Ok(detail) => self.api().comments(post).await.map(|c| (detail, c)),
            Err(e) => Err(e),
        };

        self.apply_read(
            origin,
            result,
            Some(notice::POST_LOAD_FAILED),
            |state, (detail, comments)| {
                state.upsert_post(detail);
                state
                    .comments
                    .insert(post, comments.into_iter().map(CommentLine::from).collect());
                state.open_post = Some(post);
            },
        )
    }

    /// Own profile and post grid.
    pub(crate) async fn load_profile(&self) -> Outcome {
        let origin = self.origin();
        let result = match self.api().current_user().await {
            Ok(user) => self
                .api()
                .user_posts(&user.username)
                .await
                .map(|posts| (user, posts)),
            Err(e) => Err(e),
        };

        self.apply_read(
            origin,
            result,
            Some(notice::PROFILE_LOAD_FAILED),
            |state, (user, posts)| {
                state.grid = Some(Grid::User(user.username.clone()));
                state.profile = Some(user);
                state.set_posts(posts);
            },
        )
    }

    /// Failures here are logged only; the sidebar simply stays empty.
    pub(crate) async fn load_suggestions(&self) -> Outcome {
        let origin = self.origin();
        let limit = self.options().suggestion_limit;
        let result = self.api().suggestions(limit).await;

        self.apply_read(origin, result, None, |state, users| {
            state.suggestions = users;
        })
    }

    /// View epoch and session a read is issued under.
    fn origin(&self) -> ReadOrigin {
        ReadOrigin {
            epoch: self.view().epoch(),
            issuer: self.session().current(),
        }
    }

    fn apply_read<T>(
        &self,
        origin: ReadOrigin,
        result: Result<T, ApiError>,
        toast: Option<&str>,
        apply: impl FnOnce(&mut FeedState, T),
    ) -> Outcome {
        let ReadOrigin { epoch, issuer } = origin;
        match result {
            Err(ApiError::AuthExpired | ApiError::NoSession) => {
                self.session_lost(issuer.as_ref(), epoch)
            }
            Err(err) => {
                warn!(error = %err, "Load failed");
                let notice = toast.unwrap_or(notice::SUGGESTIONS_FAILED).to_string();
                if self.view().epoch() == epoch && toast.is_some() {
                    self.view().update(|s| s.toasts.error(notice.clone()));
                }
                Outcome::LoadFailed { notice }
            }
            Ok(value) => {
                let mut state = self.view().lock();
                if state.epoch != epoch {
                    return Outcome::Stale;
                }
                apply(&mut *state, value);
                Outcome::Loaded
            }
        }
    }
}

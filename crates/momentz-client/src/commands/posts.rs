use tracing::warn;

use momentz_media::EncodedImage;
use momentz_shared::protocol::CreatePostRequest;
use momentz_shared::{Post, PostId, ValidationError};

use crate::coordinator::{Coordinator, Snapshot};
use crate::error::ApiError;
use crate::events::{Intent, Mutation, MutationKind, Outcome, Target};
use crate::notify::notice;
use crate::view::Grid;

impl Coordinator {
    /// Upload a normalized image. Not optimistic: the loading indicator
    /// stays up until the server answers, then the grid is re-fetched.
    pub(crate) async fn create_post(&self, image: Option<EncodedImage>, caption: &str) -> Outcome {
        let Some(image) = image else {
            return Outcome::Invalid(ValidationError::NoImageSelected);
        };

        let mutation = Mutation::new(MutationKind::CreatePost, Target::Me);
        let _claim = self.inflight().claim(mutation).await;

        let request = CreatePostRequest {
            image_url: image.to_data_uri(),
            caption: caption.trim().to_string(),
        };
        let pending = self.begin(mutation, true, |_| Snapshot::Untouched);

        let result = match self.api().create_post(&request).await {
            Ok(()) => self.fetch_grid().await,
            Err(e) => Err(e),
        };

        self.settle(
            pending,
            result,
            |err| match err {
                ApiError::Rejected { status, .. } => notice::create_post_failed(*status),
                _ => notice::POST_NETWORK_ERROR.to_string(),
            },
            |state, refreshed| {
                apply_refresh(state, refreshed);
                state.toasts.success(notice::POST_CREATED);
                Outcome::Confirmed
            },
        )
    }

    pub(crate) async fn delete_post(&self, post: PostId, confirmed: bool) -> Outcome {
        if !confirmed {
            return Outcome::ConfirmationRequired(Box::new(Intent::DeletePost {
                post,
                confirmed: false,
            }));
        }

        let mutation = Mutation::new(MutationKind::DeletePost, Target::Post(post));
        let _claim = self.inflight().claim(mutation).await;

        let pending = self.begin(mutation, true, |_| Snapshot::Untouched);

        let result = match self.api().delete_post(post).await {
            Ok(()) => self.fetch_grid().await,
            Err(e) => Err(e),
        };

        self.settle(
            pending,
            result,
            |_| notice::DELETE_FAILED.to_string(),
            |state, refreshed| {
                state.posts.retain(|c| c.id() != post);
                state.comments.remove(&post);
                if state.open_post == Some(post) {
                    state.open_post = None;
                }
                if let Some(profile) = state.profile.as_mut() {
                    profile.posts_count = profile.posts_count.saturating_sub(1);
                }
                apply_refresh(state, refreshed);
                state.toasts.success(notice::POST_DELETED);
                Outcome::Confirmed
            },
        )
    }

    /// Re-fetch whichever grid is on screen.
    ///
    /// A failed refresh after a successful mutation is not the mutation's
    /// failure, so only an expired session is propagated.
    async fn fetch_grid(&self) -> Result<Option<Vec<Post>>, ApiError> {
        let grid = self.view().read(|s| s.grid.clone());
        let fetched = match grid {
            Some(Grid::Feed) => {
                let size = self.options().feed_page_size;
                self.api().feed(0, size).await
            }
            Some(Grid::User(username)) => self.api().user_posts(&username).await,
            None => return Ok(None),
        };
        match fetched {
            Ok(posts) => Ok(Some(posts)),
            Err(e @ (ApiError::AuthExpired | ApiError::NoSession)) => Err(e),
            Err(e) => {
                warn!(error = %e, "Refresh after mutation failed");
                Ok(None)
            }
        }
    }
}

fn apply_refresh(state: &mut crate::view::FeedState, refreshed: Option<Vec<Post>>) {
    if let Some(posts) = refreshed {
        state.set_posts(posts);
    }
}

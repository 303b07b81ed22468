use tracing::debug;

use momentz_shared::PostId;

use crate::coordinator::{Coordinator, Pending, Snapshot};
use crate::events::{Effect, Mutation, MutationKind, Outcome, Target};
use crate::inflight::Claim;
use crate::notify::notice;

/// A like toggle that has been claimed and rendered but not yet sent.
#[derive(Debug)]
pub(crate) struct LikeTicket {
    pending: Pending,
    post: PostId,
    _claim: Claim,
}

impl Coordinator {
    /// Claim the post's like lane and render the toggled state.
    ///
    /// Returns `Busy` while a previous toggle on the same post is still in
    /// flight.
    pub(crate) fn begin_like(&self, post: PostId) -> Result<LikeTicket, Outcome> {
        let lane = Mutation::new(MutationKind::Like, Target::Post(post));
        let Some(claim) = self.inflight().try_claim(lane) else {
            debug!(post = %post, "Like toggle ignored, previous one still in flight");
            return Err(Outcome::Busy);
        };

        let current = self.view().read(|s| s.card(post).map(|c| c.like));
        let Some(before) = current else {
            debug!(post = %post, "Like toggle for a post that is not rendered");
            return Err(Outcome::Stale);
        };

        let after = before.toggled();
        let kind = if after.liked {
            MutationKind::Like
        } else {
            MutationKind::Unlike
        };

        let pending = self.begin(Mutation::new(kind, Target::Post(post)), false, |state| {
            if let Some(card) = state.card_mut(post) {
                card.like = after;
                card.like_pending = true;
            }
            Snapshot::Like {
                post,
                state: before,
            }
        });

        Ok(LikeTicket {
            pending,
            post,
            _claim: claim,
        })
    }

    /// Send the toggle and settle it. The lane is released on return.
    pub(crate) async fn finish_like(&self, ticket: LikeTicket) -> Outcome {
        let LikeTicket {
            pending,
            post,
            _claim,
        } = ticket;
        let liking = pending.mutation.kind == MutationKind::Like;

        let result = if liking {
            self.api().like(post).await
        } else {
            self.api().unlike(post).await
        };

        let outcome = self.settle(
            pending,
            result,
            |_| notice::LIKE_FAILED.to_string(),
            |state, ()| {
                if let Some(card) = state.card_mut(post) {
                    card.like_pending = false;
                    card.post.liked_by_current_user = card.like.liked;
                    card.post.likes_count = card.like.count;
                }
                Outcome::Confirmed
            },
        );

        if liking && outcome == Outcome::Confirmed {
            self.publish_effect(Effect::FloatingHeart { post });
        }
        outcome
    }
}

use momentz_shared::UserId;

use crate::coordinator::{message_or, Coordinator, Snapshot};
use crate::events::{Mutation, MutationKind, Outcome, Target};
use crate::notify::notice;
use crate::view::FollowButton;

impl Coordinator {
    pub(crate) async fn follow(&self, user: UserId) -> Outcome {
        let mutation = Mutation::new(MutationKind::Follow, Target::User(user));
        let _claim = self.inflight().claim(mutation).await;

        if self.view().read(|s| s.follow_button(user)) == FollowButton::Following {
            return Outcome::AlreadyDone;
        }

        let pending = self.begin(mutation, false, |state| {
            let button = state.follow_button(user);
            state.follow_buttons.insert(user, FollowButton::Pending);
            Snapshot::Follow { user, button }
        });

        let result = self.api().follow(user).await;

        self.settle(
            pending,
            result,
            |err| message_or(err, notice::FOLLOW_FAILED),
            |state, ()| {
                state.follow_buttons.insert(user, FollowButton::Following);
                state.toasts.success(notice::FOLLOWING);
                Outcome::Confirmed
            },
        )
    }
}

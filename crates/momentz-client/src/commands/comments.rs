use chrono::Utc;

use momentz_shared::{validation, PostId};

use crate::coordinator::{Coordinator, Snapshot};
use crate::events::{Mutation, MutationKind, Outcome, Target};
use crate::notify::notice;
use crate::view::CommentLine;

impl Coordinator {
    pub(crate) async fn submit_comment(&self, post: PostId, content: &str) -> Outcome {
        let request = match validation::comment(content) {
            Ok(req) => req,
            Err(e) => return Outcome::Invalid(e),
        };
        let Some(session) = self.session().current() else {
            return self.session_lost(None, self.view().epoch());
        };

        let mutation = Mutation::new(MutationKind::Comment, Target::Post(post));
        let _claim = self.inflight().claim(mutation).await;

        let line = CommentLine::provisional(&session.username, &request.content, Utc::now());
        let local_id = line.local_id;

        let pending = self.begin(mutation, false, |state| {
            let lines = state.comments.get(&post).cloned();
            let count = state.card(post).map(|c| c.post.comments_count);

            state.comments.entry(post).or_default().push(line);
            if let Some(card) = state.card_mut(post) {
                card.post.comments_count += 1;
            }
            Snapshot::Comments { post, lines, count }
        });

        let result = self.api().add_comment(post, &request).await;

        self.settle(
            pending,
            result,
            |_| notice::COMMENT_FAILED.to_string(),
            |state, comment| {
                let confirmed = CommentLine::from(comment);
                let lines = state.comments.entry(post).or_default();
                match lines.iter_mut().find(|l| l.local_id == local_id) {
                    Some(slot) => *slot = confirmed,
                    None => lines.push(confirmed),
                }
                state.toasts.success(notice::COMMENT_POSTED);
                Outcome::Confirmed
            },
        )
    }
}

//! Optimistic mutation coordinator.
//!
//! Every mutation follows the same path: snapshot the affected fields,
//! render the optimistic value, call the API, then settle. Settling keeps
//! (or replaces with server data) the optimistic value on success, puts
//! the snapshot back on failure, and hands over to the session owner on
//! a 401 for the session that issued it. The per-kind steps live in
//! [`crate::commands`].

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use momentz_shared::{PostId, User, UserId};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::events::{Effect, Intent, Mutation, Outcome, UiEvent};
use crate::gateway::Api;
use crate::inflight::InFlight;
use crate::notify::notice;
use crate::session::{Session, SessionManager};
use crate::view::{CommentLine, FeedState, FollowButton, LikeState, ViewStore};

const EVENT_CAPACITY: usize = 64;

/// Per-view knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub feed_page_size: u32,
    pub suggestion_limit: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for ViewOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            feed_page_size: config.feed_page_size,
            suggestion_limit: config.suggestion_limit,
        }
    }
}

/// Rendered fields captured before an optimistic change.
#[derive(Debug, Clone)]
pub(crate) enum Snapshot {
    Like {
        post: PostId,
        state: LikeState,
    },
    Follow {
        user: UserId,
        button: FollowButton,
    },
    Comments {
        post: PostId,
        lines: Option<Vec<CommentLine>>,
        count: Option<u64>,
    },
    Profile(Option<User>),
    /// Nothing was pre-applied (create/delete).
    Untouched,
}

impl Snapshot {
    fn is_optimistic(&self) -> bool {
        !matches!(self, Snapshot::Untouched)
    }

    fn restore(self, state: &mut FeedState) {
        match self {
            Snapshot::Like { post, state: like } => {
                if let Some(card) = state.card_mut(post) {
                    card.like = like;
                    card.like_pending = false;
                }
            }
            Snapshot::Follow { user, button } => {
                state.follow_buttons.insert(user, button);
            }
            Snapshot::Comments { post, lines, count } => {
                match lines {
                    Some(lines) => {
                        state.comments.insert(post, lines);
                    }
                    None => {
                        state.comments.remove(&post);
                    }
                }
                if let (Some(count), Some(card)) = (count, state.card_mut(post)) {
                    card.post.comments_count = count;
                }
            }
            Snapshot::Profile(profile) => state.profile = profile,
            Snapshot::Untouched => {}
        }
    }
}

/// A mutation between its optimistic render and its settlement.
#[derive(Debug)]
pub(crate) struct Pending {
    pub mutation: Mutation,
    pub epoch: u64,
    /// Session current when the mutation began.
    pub issuer: Option<Arc<Session>>,
    pub snapshot: Snapshot,
    /// Shows the blocking loading indicator while in flight.
    pub blocking: bool,
}

#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn Api>,
    session: SessionManager,
    view: ViewStore,
    inflight: InFlight,
    events: broadcast::Sender<UiEvent>,
    options: ViewOptions,
}

impl Coordinator {
    pub fn new(
        api: Arc<dyn Api>,
        session: SessionManager,
        view: ViewStore,
        options: ViewOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                view,
                inflight: InFlight::new(),
                events,
                options,
            }),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn view(&self) -> &ViewStore {
        &self.inner.view
    }

    pub fn options(&self) -> ViewOptions {
        self.inner.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn api(&self) -> &dyn Api {
        self.inner.api.as_ref()
    }

    pub(crate) fn inflight(&self) -> &InFlight {
        &self.inner.inflight
    }

    /// Run `intent` to completion.
    pub async fn perform(&self, intent: Intent) -> Outcome {
        let action = intent.name();
        let outcome = match intent {
            Intent::ToggleLike { post } => match self.begin_like(post) {
                Ok(ticket) => self.finish_like(ticket).await,
                Err(outcome) => outcome,
            },
            Intent::Follow { user } => self.follow(user).await,
            Intent::SubmitComment { post, content } => self.submit_comment(post, &content).await,
            Intent::CreatePost { image, caption } => self.create_post(image, &caption).await,
            Intent::DeletePost { post, confirmed } => self.delete_post(post, confirmed).await,
            Intent::UpdateProfile { form } => self.update_profile(form).await,
            Intent::Login { username, password } => self.login(&username, &password).await,
            Intent::Register {
                email,
                full_name,
                username,
                password,
            } => self.register(&email, &full_name, &username, &password).await,
            Intent::Logout { confirmed } => self.logout(confirmed),
            Intent::LoadFeed => self.load_feed().await,
            Intent::OpenPost { post } => self.open_post(post).await,
            Intent::LoadProfile => self.load_profile().await,
            Intent::LoadSuggestions => self.load_suggestions().await,
        };
        self.publish_outcome(action, &outcome);
        outcome
    }

    /// Start `intent` in the background.
    ///
    /// A like toggle is claimed and rendered before this returns, so a
    /// second toggle dispatched right after it sees `Busy`.
    pub fn dispatch(&self, intent: Intent) -> JoinHandle<Outcome> {
        let this = self.clone();
        let action = intent.name();
        match intent {
            Intent::ToggleLike { post } => {
                match self.begin_like(post) {
                    Ok(ticket) => tokio::spawn(async move {
                        let outcome = this.finish_like(ticket).await;
                        this.publish_outcome(action, &outcome);
                        outcome
                    }),
                    Err(outcome) => {
                        self.publish_outcome(action, &outcome);
                        tokio::spawn(async move { outcome })
                    }
                }
            }
            other => tokio::spawn(async move { this.perform(other).await }),
        }
    }

    /// Snapshot and render under one lock.
    pub(crate) fn begin(
        &self,
        mutation: Mutation,
        blocking: bool,
        apply: impl FnOnce(&mut FeedState) -> Snapshot,
    ) -> Pending {
        let issuer = self.inner.session.current();
        self.inner.view.update(|state| {
            let snapshot = apply(state);
            if blocking {
                state.loading = true;
            }
            debug!(
                kind = mutation.kind.as_str(),
                target = %mutation.target,
                epoch = state.epoch,
                "Mutation pending"
            );
            Pending {
                mutation,
                epoch: state.epoch,
                issuer,
                snapshot,
                blocking,
            }
        })
    }

    /// Apply the result of the round trip to the view.
    pub(crate) fn settle<T>(
        &self,
        pending: Pending,
        result: Result<T, ApiError>,
        failure_notice: impl FnOnce(&ApiError) -> String,
        reconcile: impl FnOnce(&mut FeedState, T) -> Outcome,
    ) -> Outcome {
        let Pending {
            mutation,
            epoch,
            issuer,
            snapshot,
            blocking,
        } = pending;
        let kind = mutation.kind.as_str();
        let target = mutation.target;

        if let Err(ApiError::AuthExpired | ApiError::NoSession) = result {
            warn!(kind, %target, "Session gone while mutation was in flight");
            let outcome = self.session_lost(issuer.as_ref(), epoch);
            if blocking {
                self.inner.view.update(|state| {
                    if state.epoch == epoch {
                        state.loading = false;
                    }
                });
            }
            return outcome;
        }

        let mut state = self.inner.view.lock();
        if state.epoch != epoch {
            debug!(kind, %target, epoch, current = state.epoch, "Discarding result for a previous view");
            return Outcome::Stale;
        }

        if blocking {
            state.loading = false;
        }

        match result {
            Ok(value) => {
                let outcome = reconcile(&mut *state, value);
                info!(kind, %target, "Mutation confirmed");
                outcome
            }
            Err(err) => {
                let notice = failure_notice(&err);
                let optimistic = snapshot.is_optimistic();
                snapshot.restore(&mut *state);
                state.toasts.error(notice.clone());
                if optimistic {
                    warn!(kind, %target, error = %err, "Mutation rolled back");
                    Outcome::RolledBack { notice }
                } else {
                    warn!(kind, %target, error = %err, "Mutation rejected");
                    Outcome::Rejected { notice }
                }
            }
        }
    }

    /// A call sent by `issuer` while the view was at `epoch` came back
    /// unauthenticated.
    ///
    /// `issuer` is expired if it is still current. The view is torn down
    /// only when it is the one that sent the call and no newer session has
    /// taken over; otherwise the answer is `Stale`.
    pub(crate) fn session_lost(&self, issuer: Option<&Arc<Session>>, epoch: u64) -> Outcome {
        if let Some(issuer) = issuer {
            self.inner.session.expire_if(issuer);
        }

        if self.inner.view.epoch() != epoch || self.inner.session.is_active() {
            debug!(epoch, "Unauthenticated answer for a previous session, ignoring");
            return Outcome::Stale;
        }

        self.inner.view.navigate();
        self.inner.view.update(|state| {
            state.profile = None;
            state.toasts.error(notice::SESSION_EXPIRED);
        });
        Outcome::SessionExpired
    }

    pub(crate) fn publish_effect(&self, effect: Effect) {
        // No subscribers is fine.
        let _ = self.inner.events.send(UiEvent::Effect(effect));
    }

    fn publish_outcome(&self, action: &'static str, outcome: &Outcome) {
        let _ = self.inner.events.send(UiEvent::Settled {
            action,
            outcome: outcome.clone(),
        });
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("session", &self.inner.session)
            .field("options", &self.inner.options)
            .field("in_flight", &self.inner.inflight.len())
            .finish()
    }
}

/// Server message if there is one, otherwise `fallback`.
pub(crate) fn message_or(err: &ApiError, fallback: &str) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::events::ProfileForm;
    use crate::fake::FakeApi;
    use crate::session::Route;
    use momentz_media::EncodedImage;

    pub(crate) fn harness() -> (Coordinator, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::seeded());
        let session = SessionManager::in_memory();
        session.establish(Session {
            token: "tok".into(),
            user_id: UserId(1),
            username: "ana".into(),
        });
        let coordinator = Coordinator::new(
            api.clone(),
            session,
            ViewStore::default(),
            ViewOptions::default(),
        );
        (coordinator, api)
    }

    /// Harness with the feed already rendered.
    pub(crate) async fn loaded() -> (Coordinator, Arc<FakeApi>) {
        let (coordinator, api) = harness();
        assert_eq!(coordinator.perform(Intent::LoadFeed).await, Outcome::Loaded);
        (coordinator, api)
    }

    #[tokio::test]
    async fn test_expired_session_routes_to_entry() {
        let (coordinator, api) = loaded().await;
        let routes = coordinator.session().subscribe();
        api.fail("like", ApiError::AuthExpired);

        let outcome = coordinator
            .perform(Intent::ToggleLike { post: PostId(10) })
            .await;

        assert_eq!(outcome, Outcome::SessionExpired);
        assert!(coordinator.session().current().is_none());
        assert_eq!(*routes.borrow(), Route::Entry);
        coordinator.view().read(|s| assert!(s.posts.is_empty()));
    }

    #[tokio::test]
    async fn test_expiry_on_every_authenticated_call() {
        let image = EncodedImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            width: 1,
            height: 1,
            mime: "image/jpeg",
        };
        let cases = [
            ("like", Intent::ToggleLike { post: PostId(10) }),
            ("follow", Intent::Follow { user: UserId(2) }),
            (
                "add_comment",
                Intent::SubmitComment {
                    post: PostId(10),
                    content: "hi".into(),
                },
            ),
            (
                "update_profile",
                Intent::UpdateProfile {
                    form: ProfileForm::default(),
                },
            ),
            (
                "create_post",
                Intent::CreatePost {
                    image: Some(image),
                    caption: "new".into(),
                },
            ),
            (
                "delete_post",
                Intent::DeletePost {
                    post: PostId(12),
                    confirmed: true,
                },
            ),
            ("feed", Intent::LoadFeed),
            ("post", Intent::OpenPost { post: PostId(10) }),
            ("current_user", Intent::LoadProfile),
            ("suggestions", Intent::LoadSuggestions),
        ];

        for (op, intent) in cases {
            let (coordinator, api) = loaded().await;
            api.fail(op, ApiError::AuthExpired);

            let outcome = coordinator.perform(intent).await;

            assert_eq!(outcome, Outcome::SessionExpired, "{op}");
            assert!(coordinator.session().current().is_none(), "{op}");
            assert_eq!(coordinator.session().route(), Route::Entry, "{op}");
            coordinator.view().read(|s| {
                assert!(!s.loading, "{op}");
                assert!(s.posts.is_empty(), "{op}");
            });
        }
    }

    #[tokio::test]
    async fn test_late_expiry_spares_the_next_session() {
        let (coordinator, api) = loaded().await;
        api.fail("like", ApiError::AuthExpired);
        let gate = api.hold();

        let in_flight = coordinator.dispatch(Intent::ToggleLike { post: PostId(10) });

        assert_eq!(
            coordinator.perform(Intent::Logout { confirmed: true }).await,
            Outcome::LoggedOut
        );
        let fresh = coordinator.session().establish(Session {
            token: "fresh".into(),
            user_id: UserId(2),
            username: "bo".into(),
        });

        gate.add_permits(1);
        assert_eq!(in_flight.await.unwrap(), Outcome::Stale);
        assert_eq!(coordinator.session().current().as_deref(), Some(&*fresh));
        assert_eq!(coordinator.session().route(), Route::Home);
    }

    #[tokio::test]
    async fn test_outcomes_are_published() {
        let (coordinator, _api) = loaded().await;
        let mut events = coordinator.subscribe();

        coordinator
            .perform(Intent::ToggleLike { post: PostId(10) })
            .await;

        let mut saw_heart = false;
        let mut saw_settled = false;
        while let Ok(event) = events.try_recv() {
            match event {
                UiEvent::Effect(Effect::FloatingHeart { post }) => {
                    assert_eq!(post, PostId(10));
                    saw_heart = true;
                }
                UiEvent::Settled { action, outcome } => {
                    assert_eq!(action, "toggle_like");
                    assert_eq!(outcome, Outcome::Confirmed);
                    saw_settled = true;
                }
            }
        }
        assert!(saw_heart && saw_settled);
    }

    #[test]
    fn test_message_or_prefers_server_text() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("Already following".into()),
        };
        assert_eq!(message_or(&err, "fallback"), "Already following");
        assert_eq!(
            message_or(&ApiError::Transport("reset".into()), "fallback"),
            "fallback"
        );
    }
}

//! Typed messages between the UI and the coordinator.
//!
//! The UI sends an [`Intent`]; the coordinator answers with an
//! [`Outcome`] and also publishes it, together with cosmetic
//! [`Effect`]s, as a [`UiEvent`] on a broadcast channel.

use momentz_media::EncodedImage;
use momentz_shared::{PostId, UserId, ValidationError};

/// Mutations that go through the optimistic protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Like,
    Unlike,
    Follow,
    Comment,
    CreatePost,
    DeletePost,
    UpdateProfile,
}

impl MutationKind {
    /// Kinds sharing a class are serialized against each other on the
    /// same target. Like and Unlike are two sides of one toggle.
    pub fn serial_class(self) -> Self {
        match self {
            MutationKind::Unlike => MutationKind::Like,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Like => "like",
            MutationKind::Unlike => "unlike",
            MutationKind::Follow => "follow",
            MutationKind::Comment => "comment",
            MutationKind::CreatePost => "create_post",
            MutationKind::DeletePost => "delete_post",
            MutationKind::UpdateProfile => "update_profile",
        }
    }
}

/// The entity a mutation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Post(PostId),
    User(UserId),
    /// The logged-in user's own profile or post list.
    Me,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Post(id) => write!(f, "post:{id}"),
            Target::User(id) => write!(f, "user:{id}"),
            Target::Me => f.write_str("me"),
        }
    }
}

/// Serialization key for in-flight tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mutation {
    pub kind: MutationKind,
    pub target: Target,
}

impl Mutation {
    pub fn new(kind: MutationKind, target: Target) -> Self {
        Self { kind, target }
    }

    pub fn lane(&self) -> (MutationKind, Target) {
        (self.kind.serial_class(), self.target)
    }
}

/// Raw contents of the edit-profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub bio: String,
    pub website: String,
    /// Typed picture URL; ignored when `upload` is set.
    pub picture_url: String,
    pub upload: Option<EncodedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ToggleLike { post: PostId },
    Follow { user: UserId },
    SubmitComment { post: PostId, content: String },
    CreatePost { image: Option<EncodedImage>, caption: String },
    DeletePost { post: PostId, confirmed: bool },
    UpdateProfile { form: ProfileForm },
    Login { username: String, password: String },
    Register {
        email: String,
        full_name: String,
        username: String,
        password: String,
    },
    Logout { confirmed: bool },
    LoadFeed,
    OpenPost { post: PostId },
    LoadProfile,
    LoadSuggestions,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::ToggleLike { .. } => "toggle_like",
            Intent::Follow { .. } => "follow",
            Intent::SubmitComment { .. } => "submit_comment",
            Intent::CreatePost { .. } => "create_post",
            Intent::DeletePost { .. } => "delete_post",
            Intent::UpdateProfile { .. } => "update_profile",
            Intent::Login { .. } => "login",
            Intent::Register { .. } => "register",
            Intent::Logout { .. } => "logout",
            Intent::LoadFeed => "load_feed",
            Intent::OpenPost { .. } => "open_post",
            Intent::LoadProfile => "load_profile",
            Intent::LoadSuggestions => "load_suggestions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server agreed; optimistic state kept or replaced by server data.
    Confirmed,
    /// Optimistic state restored to the snapshot.
    RolledBack { notice: String },
    /// Non-optimistic failure; nothing was changed.
    Rejected { notice: String },
    /// 401: session destroyed, view routed to the entry screen.
    SessionExpired,
    /// The same like toggle is still in flight; the control is disabled.
    Busy,
    /// Already following this user.
    AlreadyDone,
    /// Settled after the view moved on; nothing applied.
    Stale,
    Invalid(ValidationError),
    /// Destructive action sent without confirmation.
    ConfirmationRequired(Box<Intent>),
    LoggedIn,
    Registered,
    LoggedOut,
    Loaded,
    LoadFailed { notice: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Confirmed
                | Outcome::LoggedIn
                | Outcome::Registered
                | Outcome::LoggedOut
                | Outcome::Loaded
        )
    }
}

/// Cosmetic, fire-and-forget feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FloatingHeart { post: PostId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Settled {
        action: &'static str,
        outcome: Outcome,
    },
    Effect(Effect),
}

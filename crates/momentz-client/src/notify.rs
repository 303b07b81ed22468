//! Short-lived, non-blocking notifications.

use std::time::{Duration, Instant};

use momentz_shared::constants::TOAST_DURATION_SECS;

/// User-visible texts.
pub mod notice {
    pub const LOGIN_OK: &str = "Login successful!";
    pub const LOGIN_FAILED: &str = "Invalid username or password";
    pub const REGISTERED: &str = "Account created! Please login.";
    pub const REGISTER_FAILED: &str = "Registration failed";
    pub const CONNECTION_ERROR: &str = "Connection error. Please try again.";
    pub const LIKE_FAILED: &str = "Failed to update like";
    pub const FOLLOWING: &str = "Following!";
    pub const FOLLOW_FAILED: &str = "Failed to follow user";
    pub const COMMENT_POSTED: &str = "Comment posted!";
    pub const COMMENT_FAILED: &str = "Failed to post comment";
    pub const POST_CREATED: &str = "Post created successfully!";
    pub const POST_NETWORK_ERROR: &str = "Network error! Please try again.";
    pub const POST_DELETED: &str = "Post deleted successfully!";
    pub const DELETE_FAILED: &str = "Failed to delete post";
    pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
    pub const PROFILE_FAILED: &str = "Failed to update profile";
    pub const FEED_FAILED: &str = "Failed to load feed";
    pub const POST_LOAD_FAILED: &str = "Failed to load post details";
    pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile";
    pub const SUGGESTIONS_FAILED: &str = "Failed to load suggestions";
    pub const SESSION_EXPIRED: &str = "Your session expired! Please log in again.";

    /// `Failed to create post (<status>)`
    pub fn create_post_failed(status: u16) -> String {
        format!("Failed to create post ({status})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

/// Active toasts, oldest first.
#[derive(Debug, Clone)]
pub struct Toasts {
    duration: Duration,
    active: Vec<Toast>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_secs(TOAST_DURATION_SECS))
    }
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            active: Vec::new(),
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel, now: Instant) {
        let message = message.into();
        match level {
            ToastLevel::Success => tracing::info!(%message, "Toast"),
            ToastLevel::Error => tracing::warn!(%message, "Toast"),
        }
        self.active.push(Toast {
            message,
            level,
            shown_at: now,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Success, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Error, Instant::now());
    }

    /// Drop expired toasts and return what is still on screen.
    pub fn visible(&mut self, now: Instant) -> &[Toast] {
        let duration = self.duration;
        self.active
            .retain(|t| now.saturating_duration_since(t.shown_at) < duration);
        &self.active
    }

    /// Most recent toast regardless of expiry.
    pub fn last(&self) -> Option<&Toast> {
        self.active.last()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

//! # momentz-client
//!
//! Client core for the Momentz photo-sharing service.
//!
//! The UI sends typed [`Intent`]s to the [`Coordinator`], which applies
//! optimistic changes to the [`ViewStore`], talks to the API through the
//! [`Api`] seam, and settles every mutation as confirmed, rolled back or
//! session-expired. The [`SessionManager`] is the single owner of the
//! credential triple.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod format;
pub mod gateway;
pub mod inflight;
pub mod notify;
pub mod session;
pub mod view;

mod commands;
#[cfg(test)]
mod fake;

pub use client::Client;
pub use config::ClientConfig;
pub use coordinator::{Coordinator, ViewOptions};
pub use error::{ApiError, ClientError};
pub use events::{Effect, Intent, Outcome, ProfileForm, UiEvent};
pub use gateway::{Api, HttpGateway};
pub use session::{Route, Session, SessionManager};
pub use view::{FeedState, ViewStore};

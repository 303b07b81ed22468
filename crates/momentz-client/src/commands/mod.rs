//! Per-kind steps of the coordinator.
//!
//! Each sub-module adds the methods for one domain to
//! [`Coordinator`](crate::coordinator::Coordinator); they are reached
//! through `Coordinator::perform` and `Coordinator::dispatch`.

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod feed;
pub(crate) mod follow;
pub(crate) mod likes;
pub(crate) mod posts;
pub(crate) mod profile;

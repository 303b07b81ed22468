//! # momentz-store
//!
//! Local persistent storage for the Momentz client, backed by SQLite.
//!
//! Only a handful of string values live here: the session triple
//! (`token`, `userId`, `username`) and the theme preference. The crate
//! exposes a synchronous `Database` handle with typed helpers for each.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod models;
pub mod session;
pub mod settings;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;

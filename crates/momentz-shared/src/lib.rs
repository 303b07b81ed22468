// Types shared by every Momentz crate: ids, API entities, wire bodies and
// input validation.

pub mod constants;
pub mod error;
pub mod models;
pub mod protocol;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use models::{Comment, Post, User};
pub use types::{CommentId, PostId, UserId};

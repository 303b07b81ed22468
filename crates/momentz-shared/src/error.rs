use thiserror::Error;

/// Input rejected before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields ({0} is missing)")]
    MissingField(&'static str),

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Please enter a valid {field} URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Please select an image")]
    NoImageSelected,
}

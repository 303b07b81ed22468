use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "momentz", author, version, about = "Momentz photo-sharing client")]
pub struct Args {
    /// REST API base URL (overrides MOMENTZ_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for the local database (overrides MOMENTZ_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        full_name: String,
    },

    /// Forget the saved session.
    Logout {
        /// Confirm the logout.
        #[arg(long)]
        yes: bool,
    },

    /// Show the logged-in profile and its posts.
    Whoami,

    /// Show the latest posts from everyone.
    Feed,

    /// Show one post with its comments.
    Show { post: i64 },

    /// Toggle the like on a post.
    Like { post: i64 },

    /// Follow a user by id.
    Follow { user: i64 },

    /// List people to follow.
    Suggestions,

    /// Comment on a post.
    Comment { post: i64, text: String },

    /// Publish a photo.
    Post {
        image: PathBuf,
        #[arg(long, default_value = "")]
        caption: String,
    },

    /// Delete one of your posts.
    Delete {
        post: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Edit your profile. Omitted fields are cleared.
    Profile {
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long, default_value = "")]
        website: String,
        /// Picture URL.
        #[arg(long, default_value = "", conflicts_with = "picture")]
        picture_url: String,
        /// Picture file, resized before upload.
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Show or switch the colour theme.
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

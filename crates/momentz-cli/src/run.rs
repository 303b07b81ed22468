//! Turns one CLI command into coordinator intents and prints the result.

use anyhow::{anyhow, bail, Result};
use chrono::Utc;

use momentz_client::format::{avatar_url, likes_label, time_ago};
use momentz_client::view::{FeedState, PostCard};
use momentz_client::{Client, Intent, Outcome, ProfileForm};
use momentz_shared::{PostId, UserId};

use crate::args::Command;

pub async fn run(client: &mut Client, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            expect(client, Intent::Login { username, password }).await?;
            let who = client
                .session()
                .current()
                .map(|s| s.username.clone())
                .unwrap_or_default();
            println!("Logged in as @{who}");
        }

        Command::Register {
            email,
            username,
            password,
            full_name,
        } => {
            expect(
                client,
                Intent::Register {
                    email,
                    full_name,
                    username: username.clone(),
                    password,
                },
            )
            .await?;
            println!("Account created! Log in with `momentz login {username}`.");
        }

        Command::Logout { yes } => {
            expect(client, Intent::Logout { confirmed: yes }).await?;
            println!("Logged out.");
        }

        Command::Whoami => {
            require_session(client)?;
            expect(client, Intent::LoadProfile).await?;
            client.view().read(print_profile);
        }

        Command::Feed => {
            require_session(client)?;
            expect(client, Intent::LoadFeed).await?;
            client.view().read(|state| {
                if state.posts.is_empty() {
                    println!("No posts yet. Be the first to share a moment!");
                }
                state.posts.iter().for_each(print_card);
            });
        }

        Command::Show { post } => {
            require_session(client)?;
            expect(client, Intent::OpenPost { post: PostId(post) }).await?;
            client.view().read(|state| print_detail(state, PostId(post)));
        }

        Command::Like { post } => {
            require_session(client)?;
            let post = PostId(post);
            expect(client, Intent::OpenPost { post }).await?;
            expect(client, Intent::ToggleLike { post }).await?;
            client.view().read(|state| {
                if let Some(card) = state.card(post) {
                    let icon = if card.like.liked { "♥" } else { "♡" };
                    println!("{icon} {}", likes_label(card.like.count));
                }
            });
        }

        Command::Follow { user } => {
            require_session(client)?;
            match client
                .coordinator()
                .perform(Intent::Follow { user: UserId(user) })
                .await
            {
                Outcome::AlreadyDone => println!("Already following."),
                other => {
                    check(other)?;
                    println!("Following!");
                }
            }
        }

        Command::Suggestions => {
            require_session(client)?;
            expect(client, Intent::LoadSuggestions).await?;
            client.view().read(|state| {
                for user in &state.suggestions {
                    println!(
                        "{:>6}  @{}  {}",
                        user.id,
                        user.username,
                        user.full_name.as_deref().unwrap_or("")
                    );
                }
            });
        }

        Command::Comment { post, text } => {
            require_session(client)?;
            let post = PostId(post);
            expect(client, Intent::OpenPost { post }).await?;
            expect(
                client,
                Intent::SubmitComment {
                    post,
                    content: text,
                },
            )
            .await?;
            println!("Comment posted!");
        }

        Command::Post { image, caption } => {
            require_session(client)?;
            client.select_post_image(&image).await?;
            expect(client, Intent::LoadFeed).await?;
            check(client.create_post(&caption).await)?;
            println!("Post created successfully!");
        }

        Command::Delete { post, yes } => {
            require_session(client)?;
            expect(
                client,
                Intent::DeletePost {
                    post: PostId(post),
                    confirmed: yes,
                },
            )
            .await?;
            println!("Post deleted.");
        }

        Command::Profile {
            full_name,
            bio,
            website,
            picture_url,
            picture,
        } => {
            require_session(client)?;
            if let Some(path) = picture {
                client.select_profile_image(&path).await?;
            }
            expect(client, Intent::LoadProfile).await?;
            let form = ProfileForm {
                full_name,
                bio,
                website,
                picture_url,
                upload: None,
            };
            check(client.update_profile(form).await)?;
            client.view().read(print_profile);
        }

        Command::Theme { toggle } => {
            let theme = if toggle {
                client.toggle_theme()?
            } else {
                client.theme()?
            };
            println!("Theme: {theme}");
        }
    }
    Ok(())
}

async fn expect(client: &Client, intent: Intent) -> Result<()> {
    let outcome = client.coordinator().perform(intent).await;
    check(outcome)
}

/// Success outcomes pass; everything else becomes an error for `main`.
fn check(outcome: Outcome) -> Result<()> {
    match outcome {
        o if o.is_success() => Ok(()),
        Outcome::RolledBack { notice }
        | Outcome::Rejected { notice }
        | Outcome::LoadFailed { notice } => Err(anyhow!(notice)),
        Outcome::Invalid(e) => Err(anyhow!(e)),
        Outcome::SessionExpired => Err(anyhow!(
            "Your session expired. Run `momentz login` again."
        )),
        Outcome::ConfirmationRequired(intent) => Err(anyhow!(
            "`{}` needs confirmation; pass --yes",
            intent.name()
        )),
        Outcome::Busy => Err(anyhow!("Still waiting for the previous request")),
        Outcome::AlreadyDone => Ok(()),
        other => Err(anyhow!("Unexpected result: {other:?}")),
    }
}

fn require_session(client: &Client) -> Result<()> {
    if !client.session().is_active() {
        bail!("Not logged in. Run `momentz login <username> --password <password>` first.");
    }
    Ok(())
}

fn print_card(card: &PostCard) {
    let post = &card.post;
    println!(
        "#{}  @{}  · {}",
        post.id,
        post.author_username,
        time_ago(post.created_at, Utc::now())
    );
    if let Some(caption) = post.caption.as_deref().filter(|c| !c.is_empty()) {
        println!("    {caption}");
    }
    println!(
        "    {} · {} comments",
        likes_label(card.like.count),
        post.comments_count
    );
}

fn print_detail(state: &FeedState, id: PostId) {
    let Some(card) = state.card(id) else {
        return;
    };
    print_card(card);
    println!(
        "    avatar: {}",
        avatar_url(
            &card.post.author_username,
            card.post.user_profile_picture.as_deref(),
            80
        )
    );
    for line in state.comments.get(&id).into_iter().flatten() {
        println!(
            "    @{}: {}  ({})",
            line.author_username,
            line.content,
            time_ago(line.created_at, Utc::now())
        );
    }
}

fn print_profile(state: &FeedState) {
    let Some(user) = &state.profile else {
        return;
    };
    println!("@{}  {}", user.username, user.full_name.as_deref().unwrap_or(""));
    println!(
        "{} posts · {} followers · {} following",
        user.posts_count, user.followers_count, user.following_count
    );
    if let Some(bio) = &user.bio {
        println!("{bio}");
    }
    if let Some(site) = &user.website {
        println!("{site}");
    }
    println!(
        "avatar: {}",
        avatar_url(&user.username, user.profile_picture.as_deref(), 128)
    );
    state.posts.iter().for_each(print_card);
}

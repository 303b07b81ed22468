//! In-memory stand-in for the REST API, used by the coordinator tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use momentz_shared::protocol::{
    CommentRequest, CreatePostRequest, LoginRequest, LoginResponse, RegisterRequest,
    UpdateProfileRequest,
};
use momentz_shared::{Comment, CommentId, Post, PostId, User, UserId};

use crate::error::ApiError;
use crate::gateway::Api;

pub(crate) struct FakeApi {
    server: Mutex<FakeServer>,
}

struct FakeServer {
    me: User,
    users: Vec<User>,
    posts: Vec<Post>,
    comments: HashMap<PostId, Vec<Comment>>,
    following: HashSet<UserId>,
    next_id: i64,
    failures: HashMap<&'static str, ApiError>,
    calls: Vec<&'static str>,
    gate: Option<Arc<Semaphore>>,
    last_profile_update: Option<UpdateProfileRequest>,
    last_feed_query: Option<(u32, u32)>,
    last_suggestion_limit: Option<u32>,
}

fn user(id: i64, username: &str) -> User {
    User {
        id: UserId(id),
        username: username.to_string(),
        email: None,
        full_name: None,
        bio: None,
        website: None,
        profile_picture: None,
        posts_count: 0,
        followers_count: 0,
        following_count: 0,
    }
}

fn post(id: i64, author: &str, likes: u64, liked: bool, comments: u64) -> Post {
    Post {
        id: PostId(id),
        author_username: author.to_string(),
        user_profile_picture: None,
        image_url: format!("https://img.example/{id}.jpg"),
        caption: Some(format!("post {id}")),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        likes_count: likes,
        liked_by_current_user: liked,
        comments_count: comments,
    }
}

impl FakeApi {
    /// Logged-in user `ana` (id 1); feed posts 10 (bo, 10 likes, not
    /// liked), 11 (cy, one comment, liked) and 12 (ana).
    pub(crate) fn seeded() -> Self {
        let mut me = user(1, "ana");
        me.full_name = Some("Ana".into());
        me.posts_count = 1;

        let users = ["bo", "cy", "di", "ed", "fi", "gu"]
            .iter()
            .enumerate()
            .map(|(i, name)| user(i as i64 + 2, name))
            .collect();

        let mut comments = HashMap::new();
        comments.insert(
            PostId(11),
            vec![Comment {
                id: CommentId(100),
                author_username: "cy".into(),
                user_profile_picture: None,
                content: "first!".into(),
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(),
            }],
        );

        Self {
            server: Mutex::new(FakeServer {
                me,
                users,
                posts: vec![
                    post(10, "bo", 10, false, 0),
                    post(11, "cy", 3, true, 1),
                    post(12, "ana", 0, false, 0),
                ],
                comments,
                following: HashSet::new(),
                next_id: 1000,
                failures: HashMap::new(),
                calls: Vec::new(),
                gate: None,
                last_profile_update: None,
                last_feed_query: None,
                last_suggestion_limit: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeServer> {
        self.server.lock().unwrap()
    }

    /// Make every later call to `op` fail with `err`.
    pub(crate) fn fail(&self, op: &'static str, err: ApiError) {
        self.lock().failures.insert(op, err);
    }

    /// Park every later call until a permit is added to the returned
    /// semaphore. Each permit lets exactly one call through.
    pub(crate) fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.lock().gate = Some(gate.clone());
        gate
    }

    /// Stop parking calls.
    pub(crate) fn release(&self) {
        self.lock().gate = None;
    }

    pub(crate) fn calls_to(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub(crate) fn post_likes(&self, id: PostId) -> (bool, u64) {
        let server = self.lock();
        let post = server.posts.iter().find(|p| p.id == id).unwrap();
        (post.liked_by_current_user, post.likes_count)
    }

    pub(crate) fn last_profile_update(&self) -> Option<UpdateProfileRequest> {
        self.lock().last_profile_update.clone()
    }

    pub(crate) fn last_feed_query(&self) -> Option<(u32, u32)> {
        self.lock().last_feed_query
    }

    pub(crate) fn last_suggestion_limit(&self) -> Option<u32> {
        self.lock().last_suggestion_limit
    }

    async fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        let gate = {
            let mut server = self.lock();
            server.calls.push(op);
            server.gate.clone()
        };
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.lock().failures.get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Rejected {
            status: 404,
            message: Some("Not found".into()),
        }
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.enter("login").await?;
        let server = self.lock();
        if req.username != server.me.username || req.password != "secret" {
            return Err(ApiError::Rejected {
                status: 401,
                message: None,
            });
        }
        Ok(LoginResponse {
            token: "tok".into(),
            id: server.me.id,
            username: server.me.username.clone(),
        })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        self.enter("register").await?;
        let mut server = self.lock();
        if server.users.iter().any(|u| u.username == req.username) {
            return Err(ApiError::Rejected {
                status: 400,
                message: Some("Username is already taken".into()),
            });
        }
        let id = server.next_id;
        server.next_id += 1;
        server.users.push(user(id, &req.username));
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.enter("current_user").await?;
        Ok(self.lock().me.clone())
    }

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.enter("update_profile").await?;
        let mut server = self.lock();
        server.last_profile_update = Some(req.clone());
        server.me.full_name = req.full_name.clone();
        server.me.bio = req.bio.clone();
        server.me.website = req.website.clone();
        if let Some(picture) = &req.profile_picture {
            server.me.profile_picture = Some(picture.clone());
        }
        Ok(server.me.clone())
    }

    async fn follow(&self, user: UserId) -> Result<(), ApiError> {
        self.enter("follow").await?;
        let mut server = self.lock();
        if !server.following.insert(user) {
            return Err(ApiError::Rejected {
                status: 400,
                message: Some("Already following".into()),
            });
        }
        Ok(())
    }

    async fn suggestions(&self, limit: u32) -> Result<Vec<User>, ApiError> {
        self.enter("suggestions").await?;
        let mut server = self.lock();
        server.last_suggestion_limit = Some(limit);
        Ok(server
            .users
            .iter()
            .filter(|u| !server.following.contains(&u.id))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn feed(&self, page: u32, size: u32) -> Result<Vec<Post>, ApiError> {
        self.enter("feed").await?;
        let mut server = self.lock();
        server.last_feed_query = Some((page, size));
        Ok(server
            .posts
            .iter()
            .skip((page * size) as usize)
            .take(size as usize)
            .cloned()
            .collect())
    }

    async fn post(&self, id: PostId) -> Result<Post, ApiError> {
        self.enter("post").await?;
        self.lock()
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_post(&self, req: &CreatePostRequest) -> Result<(), ApiError> {
        self.enter("create_post").await?;
        let mut server = self.lock();
        let id = server.next_id;
        server.next_id += 1;
        let author = server.me.username.clone();
        let mut created = post(id, &author, 0, false, 0);
        created.image_url = req.image_url.clone();
        created.caption = (!req.caption.is_empty()).then(|| req.caption.clone());
        created.created_at = Utc::now();
        server.posts.insert(0, created);
        server.me.posts_count += 1;
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ApiError> {
        self.enter("delete_post").await?;
        let mut server = self.lock();
        let before = server.posts.len();
        server.posts.retain(|p| p.id != id);
        if server.posts.len() == before {
            return Err(Self::not_found());
        }
        server.comments.remove(&id);
        Ok(())
    }

    async fn user_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        self.enter("user_posts").await?;
        Ok(self
            .lock()
            .posts
            .iter()
            .filter(|p| p.author_username == username)
            .cloned()
            .collect())
    }

    async fn like(&self, id: PostId) -> Result<(), ApiError> {
        self.enter("like").await?;
        let mut server = self.lock();
        let post = server
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;
        if !post.liked_by_current_user {
            post.liked_by_current_user = true;
            post.likes_count += 1;
        }
        Ok(())
    }

    async fn unlike(&self, id: PostId) -> Result<(), ApiError> {
        self.enter("unlike").await?;
        let mut server = self.lock();
        let post = server
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;
        if post.liked_by_current_user {
            post.liked_by_current_user = false;
            post.likes_count = post.likes_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn comments(&self, id: PostId) -> Result<Vec<Comment>, ApiError> {
        self.enter("comments").await?;
        Ok(self.lock().comments.get(&id).cloned().unwrap_or_default())
    }

    async fn add_comment(&self, id: PostId, req: &CommentRequest) -> Result<Comment, ApiError> {
        self.enter("add_comment").await?;
        let mut server = self.lock();
        let comment_id = server.next_id;
        server.next_id += 1;
        let comment = Comment {
            id: CommentId(comment_id),
            author_username: server.me.username.clone(),
            user_profile_picture: None,
            content: req.content.clone(),
            created_at: Utc::now(),
        };
        server.comments.entry(id).or_default().push(comment.clone());
        if let Some(post) = server.posts.iter_mut().find(|p| p.id == id) {
            post.comments_count += 1;
        }
        Ok(comment)
    }
}

//! Session-aware access to the Momentz REST API.
//!
//! [`Api`] is the seam the coordinator talks to; [`HttpGateway`] is the
//! real implementation over `reqwest`. The gateway attaches the bearer
//! token, turns every failure into an [`ApiError`], and on a 401 from an
//! authenticated call tears down the session whose token was sent.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use momentz_shared::protocol::{
    CommentRequest, CreatePostRequest, ErrorBody, LoginRequest, LoginResponse, RegisterRequest,
    UpdateProfileRequest,
};
use momentz_shared::{Comment, Post, PostId, User, UserId};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::session::{Session, SessionManager};

/// One method per remote operation.
#[async_trait]
pub trait Api: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// The created user is not needed by the client; only success matters.
    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError>;

    async fn current_user(&self) -> Result<User, ApiError>;

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User, ApiError>;

    async fn follow(&self, user: UserId) -> Result<(), ApiError>;

    async fn suggestions(&self, limit: u32) -> Result<Vec<User>, ApiError>;

    async fn feed(&self, page: u32, size: u32) -> Result<Vec<Post>, ApiError>;

    async fn post(&self, id: PostId) -> Result<Post, ApiError>;

    /// The feed is re-fetched afterwards, so the body is not decoded.
    async fn create_post(&self, req: &CreatePostRequest) -> Result<(), ApiError>;

    async fn delete_post(&self, id: PostId) -> Result<(), ApiError>;

    async fn user_posts(&self, username: &str) -> Result<Vec<Post>, ApiError>;

    async fn like(&self, id: PostId) -> Result<(), ApiError>;

    async fn unlike(&self, id: PostId) -> Result<(), ApiError>;

    async fn comments(&self, id: PostId) -> Result<Vec<Comment>, ApiError>;

    async fn add_comment(&self, id: PostId, req: &CommentRequest) -> Result<Comment, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// A request ready to send, plus the session whose token it carries.
struct Call {
    builder: RequestBuilder,
    issuer: Option<Arc<Session>>,
}

impl Call {
    fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }
}

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    session: SessionManager,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig, session: SessionManager) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::Http(format!("invalid API URL '{}': {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Http(format!(
                "API URL '{}' cannot carry a path",
                config.api_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str], auth: Auth) -> Result<Call, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.client.request(method, url);
        match auth {
            Auth::Anonymous => Ok(Call {
                builder,
                issuer: None,
            }),
            Auth::Bearer => {
                let session = self.session.current().ok_or(ApiError::NoSession)?;
                Ok(Call {
                    builder: builder.bearer_auth(&session.token),
                    issuer: Some(session),
                })
            }
        }
    }

    /// Send and map the status. Only 2xx responses come back as `Ok`.
    async fn send(&self, call: Call) -> Result<Response, ApiError> {
        let Call { builder, issuer } = call;
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response arrived");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(issuer) = &issuer {
                self.session.expire_if(issuer);
                return Err(ApiError::AuthExpired);
            }
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message);

        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let call = self.request(Method::GET, segments, Auth::Bearer)?;
        let response = self.send(call).await?;
        Self::decode(response).await
    }

    async fn ack(&self, method: Method, segments: &[&str]) -> Result<(), ApiError> {
        let call = self.request(method, segments, Auth::Bearer)?;
        self.send(call).await.map(|_| ())
    }
}

#[async_trait]
impl Api for HttpGateway {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = self
            .request(Method::POST, &["auth", "login"], Auth::Anonymous)?
            .json(req);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &["auth", "register"], Auth::Anonymous)?
            .json(req);
        self.send(request).await.map(|_| ())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json(&["users", "me"]).await
    }

    async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User, ApiError> {
        let request = self
            .request(Method::PUT, &["users", "update"], Auth::Bearer)?
            .json(req);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn follow(&self, user: UserId) -> Result<(), ApiError> {
        self.ack(Method::POST, &["users", "follow", &user.to_string()])
            .await
    }

    async fn suggestions(&self, limit: u32) -> Result<Vec<User>, ApiError> {
        let request = self
            .request(Method::GET, &["users", "suggestions"], Auth::Bearer)?
            .query(&[("limit", limit)]);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn feed(&self, page: u32, size: u32) -> Result<Vec<Post>, ApiError> {
        let request = self
            .request(Method::GET, &["posts", "all"], Auth::Bearer)?
            .query(&[("page", page), ("size", size)]);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn post(&self, id: PostId) -> Result<Post, ApiError> {
        self.get_json(&["posts", &id.to_string()]).await
    }

    async fn create_post(&self, req: &CreatePostRequest) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &["posts"], Auth::Bearer)?
            .json(req);
        self.send(request).await.map(|_| ())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ApiError> {
        self.ack(Method::DELETE, &["posts", &id.to_string()]).await
    }

    async fn user_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        self.get_json(&["posts", "user", username]).await
    }

    async fn like(&self, id: PostId) -> Result<(), ApiError> {
        self.ack(Method::POST, &["likes", "post", &id.to_string()])
            .await
    }

    async fn unlike(&self, id: PostId) -> Result<(), ApiError> {
        self.ack(Method::DELETE, &["likes", "post", &id.to_string()])
            .await
    }

    async fn comments(&self, id: PostId) -> Result<Vec<Comment>, ApiError> {
        self.get_json(&["comments", "post", &id.to_string()]).await
    }

    async fn add_comment(&self, id: PostId, req: &CommentRequest) -> Result<Comment, ApiError> {
        let request = self
            .request(Method::POST, &["comments", "post", &id.to_string()], Auth::Bearer)?
            .json(req);
        let response = self.send(request).await?;
        Self::decode(response).await
    }
}

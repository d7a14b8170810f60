use crate::error::ClientError;
use crate::models::{AuthResponse, Comment, Post, User};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

/// HTTP client for the feed API.
///
/// The bearer token belongs to the client instance; `register` and `login`
/// store the token they receive, `with_token`/`set_token` install one directly.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl FeedClient {
    pub fn connect(endpoint: &str) -> Result<Self, ClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then(|| token.trim().to_string());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(req.bearer_auth(token))
    }

    // ======================= AUTH =======================

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        bio: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "bio": bio,
            }))
            .send()
            .await?;

        let auth: AuthResponse = parse(resp).await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = parse(resp).await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        let req = self.authorized(self.client.get(self.url("/auth/me")))?;
        parse(req.send().await?).await
    }

    // ======================= POSTS =======================

    pub async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        let resp = self.client.get(self.url("/posts")).send().await?;
        parse(resp).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/posts/{id}")))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn create_post(&self, content: &str) -> Result<Post, ClientError> {
        let req = self.authorized(self.client.post(self.url("/posts")))?;
        let resp = req.json(&json!({ "content": content })).send().await?;
        parse(resp).await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("/posts/{id}"))))?;
        let resp = req.send().await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_http_response(resp).await)
        }
    }

    /// Likes or unlikes the post, returning the ids of everyone who likes it now.
    pub async fn toggle_like(&self, id: Uuid) -> Result<Vec<Uuid>, ClientError> {
        let req = self.authorized(self.client.put(self.url(&format!("/posts/like/{id}"))))?;
        parse(req.send().await?).await
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        text: &str,
    ) -> Result<Vec<Comment>, ClientError> {
        let req =
            self.authorized(self.client.post(self.url(&format!("/posts/comment/{post_id}"))))?;
        let resp = req.json(&json!({ "text": text })).send().await?;
        parse(resp).await
    }

    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, ClientError> {
        let req = self.authorized(
            self.client
                .delete(self.url(&format!("/posts/comment/{post_id}/{comment_id}"))),
        )?;
        parse(req.send().await?).await
    }

    // ======================= USERS =======================

    pub async fn get_profile(&self, id: Uuid) -> Result<User, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/users/profile/{id}")))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn update_profile(
        &self,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<User, ClientError> {
        let req = self.authorized(self.client.put(self.url("/users/profile")))?;
        let resp = req
            .json(&json!({ "name": name, "bio": bio }))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn user_posts(&self, user_id: Uuid) -> Result<Vec<Post>, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/users/{user_id}/posts")))
            .send()
            .await?;
        parse(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        Ok(resp.json().await?)
    } else {
        debug!(status = %resp.status(), url = %resp.url(), "request failed");
        Err(ClientError::from_http_response(resp).await)
    }
}

//! Authenticated request construction and dispatch.
//!
//! [`ApiClient`] performs one HTTP round trip per logical operation
//! against the taskdeck backend and funnels every response through the
//! classification ladder in [`classify`](crate::classify). Calls are
//! attempted exactly once; retry and backoff, if wanted, belong to the
//! caller.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;

use taskdeck_core::models::{Credentials, Task, TaskPayload, TokenResponse, User};
use taskdeck_core::types::EntityId;

use crate::classify;
use crate::error::ApiError;
use crate::session::SessionStore;

/// HTTP client for the taskdeck REST API.
///
/// Holds a pooled [`reqwest::Client`], the API base URL, and the shared
/// [`SessionStore`]. Task operations accept an optional explicit user id;
/// when absent the id is derived from the stored token, and a call with
/// no resolvable identity fails with [`ApiError::MissingIdentity`] before
/// any network activity.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (e.g.
    /// `http://localhost:8000`), using the given session store.
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across clients).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: SessionStore,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: client,
            base_url,
            session,
        }
    }

    /// The session store this client reads tokens from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Whether a token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The user id derived from the stored token, if any.
    pub fn current_user_id(&self) -> Option<String> {
        self.session.identity()
    }

    // ---- task operations ----

    /// List all tasks owned by the user.
    pub async fn list_tasks(&self, user_id: Option<&str>) -> Result<Vec<Task>, ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(self.request(Method::GET, &format!("/api/{user}/tasks")))
            .await
    }

    /// Create a new task. New tasks start out not completed.
    pub async fn create_task(
        &self,
        payload: &TaskPayload,
        user_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(
            self.request(Method::POST, &format!("/api/{user}/tasks"))
                .json(payload),
        )
        .await
    }

    /// Fetch a single task by id.
    pub async fn get_task(
        &self,
        task_id: EntityId,
        user_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(self.request(Method::GET, &format!("/api/{user}/tasks/{task_id}")))
            .await
    }

    /// Replace a task's title and description.
    pub async fn update_task(
        &self,
        task_id: EntityId,
        payload: &TaskPayload,
        user_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(
            self.request(Method::PUT, &format!("/api/{user}/tasks/{task_id}"))
                .json(payload),
        )
        .await
    }

    /// Flip a task's completion state.
    pub async fn toggle_complete(
        &self,
        task_id: EntityId,
        user_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(self.request(
            Method::PATCH,
            &format!("/api/{user}/tasks/{task_id}/complete"),
        ))
        .await
    }

    /// Delete a task.
    pub async fn delete_task(
        &self,
        task_id: EntityId,
        user_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let user = self.resolve_user(user_id)?;
        self.execute(self.request(Method::DELETE, &format!("/api/{user}/tasks/{task_id}")))
            .await
    }

    // ---- auth operations ----

    /// Log in with email and password. On success the returned bearer
    /// token is stored in the session, replacing any prior token.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let token: TokenResponse = self
            .execute(
                self.request_anonymous(Method::POST, "/api/auth/login")
                    .json(credentials),
            )
            .await?;
        self.session.set_token(&token.access_token);
        Ok(token)
    }

    /// Register a new account. Does not log in; call [`login`](Self::login)
    /// afterwards.
    pub async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.execute(
            self.request_anonymous(Method::POST, "/api/auth/register")
                .json(credentials),
        )
        .await
    }

    /// Log out. The local token is cleared first, unconditionally; the
    /// server round trip is best-effort and a failure there is only
    /// logged. From the caller's point of view sign-out always succeeds.
    pub async fn logout(&self) {
        self.session.clear_token();

        let result: Result<serde_json::Value, ApiError> = self
            .execute(self.request(Method::POST, "/api/auth/logout"))
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "Logout request failed, but local token was cleared");
        }
    }

    /// Fetch the authenticated user's record.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.execute(self.request(Method::GET, "/api/auth/me"))
            .await
    }

    // ---- private helpers ----

    /// Resolve the user id for a task operation: an explicit id wins,
    /// otherwise the id derived from the stored token.
    fn resolve_user(&self, user_id: Option<&str>) -> Result<String, ApiError> {
        match user_id {
            Some(id) => Ok(id.to_string()),
            None => self.session.identity().ok_or(ApiError::MissingIdentity),
        }
    }

    /// Build a request with the JSON content type and, when a token is
    /// stored, the `Authorization: Bearer` header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.request_anonymous(method, path);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Build a request with the JSON content type and no auth header
    /// (login and register).
    fn request_anonymous(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send one request and classify the outcome. Transport failures
    /// before any response map to [`ApiError::Network`].
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(%status, bytes = body.len(), "Classifying API response");
        classify::classify(status, content_type.as_deref(), &body, &self.session)
    }
}

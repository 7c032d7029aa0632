//! Client for the Opportunities Hub backend API.
//!
//! Every call goes through [`BackendClient::execute`], an explicit
//! authorization middleware: it attaches the stored bearer token, and on a
//! 401 it refreshes the token pair once and re-issues the request once. The
//! retry budget is carried by an immutable [`Attempt`] descriptor rather
//! than per-request flag mutation, so a 401 on the retried request
//! propagates as a final failure.
//!
//! Concurrent 401s coalesce on a single in-flight refresh: waiters re-read
//! the store after acquiring the refresh lock and skip their own refresh if
//! another request already rotated the tokens.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::{ApiError, ApiErrorKind};
use crate::models::{
    AuthResponse, BasicProfileUpdate, CheckIn, LeaderboardPage, Profile, TokenPair,
};
use crate::store::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, SessionStore};

/// Request timeout for backend calls.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(15);

/// A request descriptor: everything needed to (re-)issue one call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    body: Option<Value>,
    /// Whether the call carries a bearer token and participates in
    /// refresh-on-401. Login, register, and refresh do not.
    authorized: bool,
}

impl RequestSpec {
    /// An authorized GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            authorized: true,
        }
    }

    /// An authorized POST with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
            authorized: true,
        }
    }

    /// An authorized PUT with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
            authorized: true,
        }
    }

    /// Marks the request as unauthenticated (no bearer, no refresh).
    pub fn unauthorized(mut self) -> Self {
        self.authorized = false;
        self
    }
}

/// Immutable retry descriptor threaded through the middleware.
///
/// `number` is 0 for the original issue and 1 for the single permitted
/// retry after a refresh.
#[derive(Debug, Clone, Copy)]
struct Attempt {
    number: u8,
}

impl Attempt {
    const fn first() -> Self {
        Self { number: 0 }
    }

    const fn retry(self) -> Self {
        Self {
            number: self.number + 1,
        }
    }

    const fn is_retry(self) -> bool {
        self.number > 0
    }
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    store: SessionStore,
    refresh_lock: Arc<Mutex<()>>,
}

impl BackendClient {
    /// Creates a backend client reading credentials from the given store.
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        // Same failure behavior as reqwest::Client::new(): only fails if the
        // TLS backend cannot initialize.
        let http = reqwest::Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.into(),
            http,
            store,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---- auth endpoints (unauthorized) ----

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let spec = RequestSpec::post(
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .unauthorized();
        self.request_json(spec).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let spec = RequestSpec::post(
            "/auth/register",
            serde_json::json!({ "name": name, "email": email, "password": password }),
        )
        .unauthorized();
        self.request_json(spec).await
    }

    /// Exchanges a refresh token for a new token pair. Does not persist.
    ///
    /// Issued directly, outside [`Self::execute`]: the refresh call itself
    /// must never trigger another refresh.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let spec = RequestSpec::post(
            "/auth/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        )
        .unauthorized();

        let response = self.issue(&spec, None).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::new(ApiErrorKind::Parse, format!("Failed to parse response: {e}"))
        })
    }

    /// Best-effort server-side session invalidation. Carries the bearer
    /// token like any other authorized call.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let spec = RequestSpec::post(
            "/auth/logout",
            serde_json::json!({ "refreshToken": refresh_token }),
        );
        self.execute(&spec).await?;
        Ok(())
    }

    // ---- authorized endpoints ----

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.request_json(RequestSpec::get("/profile")).await
    }

    pub async fn update_profile(&self, update: &BasicProfileUpdate) -> Result<Profile, ApiError> {
        let body = serde_json::to_value(update)
            .map_err(|e| ApiError::new(ApiErrorKind::Parse, format!("serialize update: {e}")))?;
        self.request_json(RequestSpec::put("/profile/basic", body))
            .await
    }

    pub async fn check_in(&self) -> Result<CheckIn, ApiError> {
        self.request_json(RequestSpec::post(
            "/users/check-in",
            serde_json::json!({}),
        ))
        .await
    }

    pub async fn leaderboard(&self, page: u32, limit: u32) -> Result<LeaderboardPage, ApiError> {
        self.request_json(RequestSpec::get(format!(
            "/community/leaderboard?page={page}&limit={limit}"
        )))
        .await
    }

    // ---- middleware ----

    /// Executes a request through the authorization middleware and parses
    /// the JSON body.
    pub async fn request_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        let response = self.execute(&spec).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::new(ApiErrorKind::Parse, format!("Failed to parse response: {e}"))
        })
    }

    /// Executes a request with refresh-on-401 semantics.
    ///
    /// At most one refresh call and one retried request per original
    /// request; a 401 on the retry propagates as a final failure.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<reqwest::Response, ApiError> {
        let mut attempt = Attempt::first();
        let mut token = if spec.authorized {
            self.read_access_token()
        } else {
            None
        };

        loop {
            let response = self.issue(spec, token.as_deref()).await?;
            let status = response.status().as_u16();

            if status != 401 || !spec.authorized || attempt.is_retry() {
                if response.status().is_success() {
                    return Ok(response);
                }
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::http_status(status, &body));
            }

            // First 401 on an authorized request: refresh once, retry once.
            let original_body = response.text().await.unwrap_or_default();
            match self.refresh_after_unauthorized(token.as_deref()).await {
                Ok(new_token) => {
                    debug!(path = %spec.path, "retrying request with refreshed token");
                    token = Some(new_token);
                    attempt = attempt.retry();
                }
                Err(refresh_err) => {
                    warn!(path = %spec.path, error = %refresh_err, "token refresh failed, clearing session");
                    if let Err(e) = self.store.clear_session() {
                        warn!(error = %e, "failed to clear session store");
                    }
                    // Propagate the original error, not the refresh error.
                    return Err(ApiError::http_status(401, &original_body));
                }
            }
        }
    }

    /// Issues one HTTP request, attaching the bearer token when present.
    async fn issue(
        &self,
        spec: &RequestSpec,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, spec.path);
        let mut builder = self
            .http
            .request(spec.method.clone(), &url)
            .header("content-type", "application/json")
            .header("accept", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| ApiError::from_reqwest(&e))
    }

    /// Reads the stored access token.
    ///
    /// A failing store read is swallowed: the request proceeds
    /// unauthenticated rather than erroring out.
    fn read_access_token(&self) -> Option<String> {
        match self.store.get(KEY_ACCESS_TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "session store read failed, proceeding unauthenticated");
                None
            }
        }
    }

    /// Obtains a fresh access token after a 401, coalescing concurrent
    /// refresh attempts.
    ///
    /// `stale` is the token the failed request was issued with. If the
    /// stored token differs once the lock is held, another request already
    /// refreshed and the stored token is reused as-is.
    async fn refresh_after_unauthorized(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if let Ok(Some(current)) = self.store.get(KEY_ACCESS_TOKEN) {
            if Some(current.as_str()) != stale {
                debug!("token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let refresh_token = self
            .store
            .get(KEY_REFRESH_TOKEN)
            .ok()
            .flatten()
            .ok_or_else(|| ApiError::new(ApiErrorKind::Session, "No refresh token available"))?;

        let pair = self.refresh(&refresh_token).await?;
        self.store
            .save_tokens(&pair.access_token, &pair.refresh_token)
            .map_err(|e| ApiError::new(ApiErrorKind::Session, format!("persist tokens: {e}")))?;
        Ok(pair.access_token)
    }
}

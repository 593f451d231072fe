use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    landing,
    models::{Decision, Session},
    routes::paths,
};

/// Path of the "who am I" endpoint, relative to the API base URL.
pub const IDENTITY_ENDPOINT: &str = "/auth/me";

/// IdentityError
///
/// Every way the authoritative identity check can fail. The guard never surfaces these;
/// any of them means the stored session is invalid.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity endpoint answered with status {0}")]
    Status(u16),
    #[error("identity response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("session has no access token")]
    MissingToken,
}

/// ClaimValue
///
/// The backend serializes ids (and sometimes grades) as numbers; the session keeps text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Number(i64),
    Text(String),
}

impl ClaimValue {
    pub fn into_text(self) -> String {
        match self {
            ClaimValue::Number(n) => n.to_string(),
            ClaimValue::Text(s) => s,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Number(value)
    }
}

/// IdentityClaims
///
/// Body of a successful `GET /auth/me`: `{ role, id, grade, is_verified }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub id: Option<ClaimValue>,
    #[serde(default)]
    pub grade: Option<ClaimValue>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

impl IdentityClaims {
    /// Overwrites the session's identity fields with the server's values. The token is
    /// left alone.
    pub fn apply_to(self, session: &mut Session) {
        session.role = self.role.as_deref().and_then(|raw| raw.parse().ok());
        session.user_id = self.id.map(ClaimValue::into_text);
        session.grade = self.grade.map(ClaimValue::into_text);
        session.is_verified = self.is_verified.unwrap_or(false);
    }
}

// 1. IdentityService Contract
/// IdentityService
///
/// Abstract access to the backend's identity endpoint, so the navigator can run against
/// the real HTTP client in production and the in-memory mock in tests.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetches the authoritative identity for a bearer token.
    async fn fetch_identity(&self, token: &str) -> Result<IdentityClaims, IdentityError>;
}

// 2. The Real Implementation
/// HttpIdentityClient
///
/// reqwest-backed client for `GET {base}/auth/me` with `Authorization: Bearer <token>`.
/// Without a configured timeout a stalled backend stalls the navigation waiting on it.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    me_url: String,
}

impl HttpIdentityClient {
    pub fn new(api_base_url: &str, timeout: Option<Duration>) -> Result<Self, IdentityError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            me_url: format!(
                "{}{}",
                api_base_url.trim_end_matches('/'),
                IDENTITY_ENDPOINT
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.me_url
    }
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn fetch_identity(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let response = self
            .client
            .get(&self.me_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        response
            .json::<IdentityClaims>()
            .await
            .map_err(IdentityError::Decode)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityService
///
/// Answers every call with the canned claims, or fails with a 401 when built with
/// `new_failing`. Clones share the call counter.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityService {
    claims: Option<IdentityClaims>,
    calls: Arc<AtomicUsize>,
}

impl MockIdentityService {
    pub fn new(claims: IdentityClaims) -> Self {
        Self {
            claims: Some(claims),
            calls: Arc::default(),
        }
    }

    pub fn new_failing() -> Self {
        Self::default()
    }

    /// Number of identity requests issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn fetch_identity(&self, _token: &str) -> Result<IdentityClaims, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.claims.clone().ok_or(IdentityError::Status(401))
    }
}

/// IdentityState
///
/// The shared handle the navigator and the HTTP state carry.
pub type IdentityState = Arc<dyn IdentityService>;

/// refresh_session
///
/// Re-checks the session against the backend after a role mismatch and decides where the
/// navigation goes from the fresh values: the verification holding page for an
/// unverified teacher, otherwise the landing page of the server-side role.
///
/// On any failure the token is cleared and the user is sent to the login page.
pub async fn refresh_session(service: &dyn IdentityService, session: &mut Session) -> Decision {
    let result = match session.token.as_deref() {
        Some(token) => service.fetch_identity(token).await,
        None => Err(IdentityError::MissingToken),
    };

    match result {
        Ok(claims) => {
            claims.apply_to(session);
            tracing::info!(role = ?session.role, verified = session.is_verified, "identity refreshed");

            if session.is_unverified_teacher() {
                Decision::redirect(paths::ACCOUNT_NOT_VERIFIED)
            } else {
                Decision::redirect(landing::default_landing(session.role))
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "identity refresh failed, clearing access token");
            session.token = None;
            Decision::redirect(paths::LOGIN)
        }
    }
}

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Identity Schemas ---

/// Role
///
/// The RBAC field carried by every authenticated user. Route eligibility is decided
/// exclusively on this value (plus the teacher verification flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or server-provided role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Session
///
/// The client-held snapshot of the authenticated user's identity and claims.
/// Built from the Identity Store on every navigation (see `store::IdentityStore`),
/// mutated in place when a role mismatch triggers an identity refresh, and loses
/// its token when that refresh fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token issued by the external login flow.
    pub token: Option<String>,
    pub role: Option<Role>,
    pub user_id: Option<String>,
    /// Class label of the teacher or student (e.g. "5A").
    pub grade: Option<String>,
    /// Teacher-only gate. Meaningless for the other roles.
    pub is_verified: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True for a teacher whose account has not been verified yet.
    /// Such teachers are confined to the holding page.
    pub fn is_unverified_teacher(&self) -> bool {
        self.role == Some(Role::Teacher) && !self.is_verified
    }
}

// --- Guard Output ---

/// Decision
///
/// The single outcome of evaluating one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    /// Navigation continues to the requested view.
    Proceed,
    /// Navigation is replaced by a navigation to `to`.
    Redirect { to: String },
}

impl Decision {
    pub fn redirect(to: impl Into<String>) -> Self {
        Decision::Redirect { to: to.into() }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed)
    }
}

// --- Navigation Service Payloads ---

/// NavigateRequest
///
/// Input payload for `POST /navigate`. The `store` is the raw key-value snapshot the
/// front end keeps in its local storage (`access_token`, `user_role`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    #[schema(example = "/teacher/class/5A/student/12")]
    pub path: String,
    #[serde(default)]
    pub store: HashMap<String, String>,
}

/// NavigateResponse
///
/// Output of `POST /navigate`: the decision plus the store snapshot after the navigation.
/// The store differs from the request only when an identity refresh ran.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateResponse {
    pub decision: Decision,
    pub store: HashMap<String, String>,
}

/// RouteInfo
///
/// Public description of a single route table entry, served by `GET /routes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteInfo {
    pub pattern: String,
    pub requires_auth: bool,
    pub required_role: Option<Role>,
    /// Path parameter that must match the session's user id for students.
    pub owner_param: Option<String>,
    /// View rendered by the route. `None` for redirect-only entries.
    pub page: Option<String>,
    /// Redirect target description for redirect-only entries.
    pub redirect: Option<String>,
}

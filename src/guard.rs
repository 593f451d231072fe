use std::str::FromStr;

use crate::{
    identity::{IdentityState, refresh_session},
    landing,
    models::{Decision, Role, Session},
    routes::{RouteParams, RouteSpec, RouteTable, RouteTarget, normalize_path, paths},
    store::IdentityStore,
};

/// Upper bound on chained redirect entries followed for a single navigation.
const MAX_REDIRECT_HOPS: usize = 8;

/// MismatchPolicy
///
/// What the navigator does when the stored role does not match a route's required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Ask the identity endpoint for the authoritative role, then redirect from the fresh
    /// session.
    #[default]
    Refresh,
    /// Redirect to the stored role's landing page without any network call.
    StoredRole,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mismatch policy: {0:?} (expected \"refresh\" or \"stored-role\")")]
pub struct UnknownPolicy(pub String);

impl FromStr for MismatchPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refresh" => Ok(MismatchPolicy::Refresh),
            "stored-role" | "stored_role" => Ok(MismatchPolicy::StoredRole),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// NavigationRequest
///
/// One navigation attempt after redirect entries have been resolved: the final target,
/// its path parameters and the access rules of the page it matched (`None` for unknown paths, which are
/// public).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest<'a> {
    pub target_path: String,
    pub params: RouteParams,
    pub route: Option<&'a RouteSpec>,
}

/// Verdict
///
/// Result of the pure guard evaluation. `RefreshIdentity` is the pending asynchronous
/// session update: the navigation cannot be decided until the identity endpoint answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Decided(Decision),
    RefreshIdentity,
}

fn not_verified() -> Verdict {
    Verdict::Decided(Decision::redirect(paths::ACCOUNT_NOT_VERIFIED))
}

fn to_login() -> Verdict {
    Verdict::Decided(Decision::redirect(paths::LOGIN))
}

/// evaluate
///
/// The navigation guard. Pure: reads the request and the session, writes nothing.
///
/// Precedence:
/// 1. public route: proceed
/// 2. no token: login
/// 3. role-restricted route: matching role proceeds (verified teachers only), a mismatch
///    needs an identity refresh
/// 4. authenticated route without role: ownership check when the route declares one,
///    otherwise proceed unless the user is an unverified teacher
pub fn evaluate(request: &NavigationRequest<'_>, session: &Session) -> Verdict {
    let Some(route) = request.route else {
        return Verdict::Decided(Decision::Proceed);
    };

    if !route.requires_auth {
        return Verdict::Decided(Decision::Proceed);
    }

    if !session.is_authenticated() {
        return to_login();
    }

    if let Some(required) = route.required_role {
        if session.role != Some(required) {
            return Verdict::RefreshIdentity;
        }
        if required == Role::Teacher && !session.is_verified {
            return not_verified();
        }
        return Verdict::Decided(Decision::Proceed);
    }

    if let Some(param) = route.owner_param {
        return check_ownership(request.params.get(param), session);
    }

    if session.is_unverified_teacher() {
        return not_verified();
    }
    Verdict::Decided(Decision::Proceed)
}

/// Profile views: teachers and admins see any student, students only themselves.
fn check_ownership(owner: Option<&str>, session: &Session) -> Verdict {
    match session.role {
        Some(Role::Teacher) | Some(Role::Admin) => Verdict::Decided(Decision::Proceed),
        Some(Role::Student) => {
            let owns = match (session.user_id.as_deref(), owner) {
                (Some(user_id), Some(owner)) => same_user_id(user_id, owner),
                _ => false,
            };
            if owns {
                Verdict::Decided(Decision::Proceed)
            } else {
                Verdict::Decided(Decision::redirect(paths::STUDENT_TASKS))
            }
        }
        None => to_login(),
    }
}

/// Ids compare as trimmed text, or numerically when both sides are all digits ("07" == "7").
pub fn same_user_id(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => a == b,
        _ => !a.is_empty() && a == b,
    }
}

fn as_number(id: &str) -> Option<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Navigator
///
/// Runs the complete navigation: resolves redirect entries, evaluates the guard and, on a
/// role mismatch, performs the identity refresh before returning the decision.
///
/// Navigations that reach a decision without a refresh have no side effects, so evaluating
/// the same target twice against an unchanged session yields the same decision.
#[derive(Clone)]
pub struct Navigator {
    routes: &'static RouteTable,
    identity: IdentityState,
    policy: MismatchPolicy,
}

impl Navigator {
    pub fn new(identity: IdentityState, policy: MismatchPolicy) -> Self {
        Self {
            routes: RouteTable::standard(),
            identity,
            policy,
        }
    }

    pub fn policy(&self) -> MismatchPolicy {
        self.policy
    }

    pub fn routes(&self) -> &'static RouteTable {
        self.routes
    }

    /// resolve
    ///
    /// Follows redirect-only entries until a page entry or an unknown path is reached.
    pub fn resolve(&self, path: &str, session: &Session) -> NavigationRequest<'static> {
        let routes: &'static RouteTable = self.routes;
        let mut target = normalize_path(path);

        for _ in 0..MAX_REDIRECT_HOPS {
            let Some(matched) = routes.lookup(&target) else {
                return NavigationRequest {
                    target_path: target,
                    params: RouteParams::default(),
                    route: None,
                };
            };

            let entry = matched.entry;
            match &entry.target {
                RouteTarget::Page(spec) => {
                    return NavigationRequest {
                        target_path: target,
                        params: matched.params,
                        route: Some(spec),
                    };
                }
                RouteTarget::Redirect(rule) => {
                    let next = normalize_path(&rule.target(&matched.params, session));
                    tracing::debug!(from = %target, to = %next, "following redirect entry");
                    target = next;
                }
            }
        }

        tracing::warn!(path = %path, "redirect chain too long, sending to login");
        NavigationRequest {
            target_path: paths::LOGIN.to_string(),
            params: RouteParams::default(),
            route: None,
        }
    }

    /// navigate_session
    ///
    /// Decides one navigation against an explicit session. The session is only mutated by
    /// an identity refresh (fresh identity on success, token cleared on failure).
    pub async fn navigate_session(&self, path: &str, session: &mut Session) -> Decision {
        let request = self.resolve(path, session);

        let decision = match evaluate(&request, session) {
            Verdict::Decided(decision) => decision,
            Verdict::RefreshIdentity => match self.policy {
                MismatchPolicy::Refresh => refresh_session(self.identity.as_ref(), session).await,
                MismatchPolicy::StoredRole => {
                    Decision::redirect(landing::default_landing(session.role))
                }
            },
        };

        // A redirect entry the guard lets through still moves the user to its target.
        let decision = match decision {
            Decision::Proceed if request.target_path != normalize_path(path) => {
                Decision::redirect(request.target_path)
            }
            other => other,
        };

        tracing::debug!(path = %path, ?decision, "navigation decided");
        decision
    }

    /// navigate
    ///
    /// Same as `navigate_session`, reading the session from and writing any change back to
    /// an identity store.
    pub async fn navigate<S>(&self, path: &str, store: &mut S) -> Decision
    where
        S: IdentityStore + Send + ?Sized,
    {
        let before = Session::load(store);
        let mut session = before.clone();

        let decision = self.navigate_session(path, &mut session).await;

        if session != before {
            session.persist_changes(&before, store);
        }
        decision
    }
}

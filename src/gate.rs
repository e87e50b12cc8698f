use std::{fmt, str::FromStr};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{AppState, assessment::AssessmentFlag, session::SessionStore};

/// Pages reachable without a session.
pub const PUBLIC_PATHS: [&str; 5] = [
    "/",
    "/login",
    "/register",
    "/recover-password",
    "/reset-password",
];

pub const LOGIN_PATH: &str = "/login";
pub const ASSESSMENT_PATH: &str = "/test";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Path prefixes the gate never looks at, matched on whole segments. `/api` routes
/// authenticate themselves; the rest are reserved for framework assets.
const UNGATED_PREFIXES: [&str; 4] = ["/api", "/_next", "/_static", "/_vercel"];

/// RouteClass
///
/// How the gate sees a requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Assessment,
    Protected,
}

/// RedirectTarget
///
/// The gate only ever sends a request to one of these three pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Assessment,
    Dashboard,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Login => LOGIN_PATH,
            RedirectTarget::Assessment => ASSESSMENT_PATH,
            RedirectTarget::Dashboard => DASHBOARD_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(RedirectTarget),
}

/// GateInputs
///
/// The two cookie-derived facts a decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInputs {
    pub token_present: bool,
    pub assessment_complete: bool,
}

impl GateInputs {
    /// Reads both facts through the same stores that write them. Cookies that fail
    /// to parse never make it into the jar, so they read as absent.
    pub fn read(jar: &CookieJar, sessions: &SessionStore, assessment: &AssessmentFlag) -> Self {
        Self {
            token_present: sessions.token(jar).is_some(),
            assessment_complete: assessment.is_complete(jar),
        }
    }
}

/// PendingPolicy
///
/// Whether a signed-in user who still owes the assessment may visit public pages.
/// `Strict` sends them to the assessment; `AllowPublic` lets them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingPolicy {
    #[default]
    Strict,
    AllowPublic,
}

impl FromStr for PendingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PendingPolicy::Strict),
            "allow-public" | "allow_public" => Ok(PendingPolicy::AllowPublic),
            other => Err(format!("unknown pending policy '{other}'")),
        }
    }
}

impl fmt::Display for PendingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingPolicy::Strict => f.write_str("strict"),
            PendingPolicy::AllowPublic => f.write_str("allow-public"),
        }
    }
}

/// Strips one trailing slash so `/login/` and `/login` are the same page.
fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// is_gated
///
/// True for every path outside the ungated prefixes. A prefix only matches itself
/// or paths below it, so `/apix` and `/dashboard/posts/1.5` are still gated.
pub fn is_gated(path: &str) -> bool {
    !UNGATED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub fn classify(path: &str) -> RouteClass {
    let path = normalize(path);
    if path == ASSESSMENT_PATH {
        RouteClass::Assessment
    } else if PUBLIC_PATHS.contains(&path) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

/// evaluate
///
/// The access gate decision. Pure: the same path, inputs and policy always give the
/// same answer.
///
/// 1. No token: public pages only, everything else goes to login.
/// 2. Token but no completed assessment: the assessment page only (public pages
///    depend on `policy`), everything else goes to the assessment.
/// 3. Token and completed assessment: the assessment page bounces to the dashboard,
///    everything else is allowed.
pub fn evaluate(path: &str, inputs: GateInputs, policy: PendingPolicy) -> GateDecision {
    let class = classify(path);

    match (inputs.token_present, inputs.assessment_complete, class) {
        (false, _, RouteClass::Public) => GateDecision::Allow,
        (false, _, _) => GateDecision::Redirect(RedirectTarget::Login),

        (true, false, RouteClass::Assessment) => GateDecision::Allow,
        (true, false, RouteClass::Public) if policy == PendingPolicy::AllowPublic => {
            GateDecision::Allow
        }
        (true, false, _) => GateDecision::Redirect(RedirectTarget::Assessment),

        (true, true, RouteClass::Assessment) => GateDecision::Redirect(RedirectTarget::Dashboard),
        (true, true, _) => GateDecision::Allow,
    }
}

/// access_gate
///
/// Router-wide middleware running the gate on every navigation request before any
/// page handler sees it. Redirects are `307 Temporary Redirect`.
pub async fn access_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !is_gated(&path) {
        return next.run(request).await;
    }

    let inputs = GateInputs::read(&jar, &state.sessions, &state.assessment);
    let decision = evaluate(&path, inputs, state.config.pending_policy);

    tracing::debug!(
        path = %path,
        token_present = inputs.token_present,
        assessment_complete = inputs.assessment_complete,
        decision = ?decision,
        "access gate evaluated"
    );

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(target) => Redirect::temporary(target.path()).into_response(),
    }
}

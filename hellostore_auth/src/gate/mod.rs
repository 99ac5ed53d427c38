//! Per-request access decisions.
//!
//! The access gate is an ordered list of guards composed by a single
//! dispatcher: public-path check, session presence, idle timeout. Each guard
//! either passes the request to the next one or decides the outcome. The
//! role gate is a separate pure check used by admin-only handlers.

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::config::SESSION_IDLE_TIMEOUT;
use crate::session::{SessionError, SessionStore, SessionUser, StoredSession};

/// Outcome of the access gate for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Pass through. Carries the session snapshot for non-public paths.
    Allow(Option<SessionUser>),
    /// Send the client to the login page with the expired indicator.
    RedirectToLogin,
}

#[derive(Debug, Clone, Copy)]
enum Guard {
    PublicPath,
    SessionPresence,
    IdleTimeout,
}

// Evaluation order matters: the timeout guard assumes the presence guard
// already loaded the session.
const GUARD_ORDER: [Guard; 3] = [Guard::PublicPath, Guard::SessionPresence, Guard::IdleTimeout];

enum Verdict {
    Next,
    Decide(GateDecision),
}

/// Paths reachable without a session.
const PUBLIC_EXACT: [&str; 5] = ["/", "/login", "/register", "/password/forgot", "/healthz"];
const PUBLIC_PREFIXES: [&str; 3] = ["/verify/", "/password/reset/", "/static/"];
const STATIC_EXTENSIONS: [&str; 11] = [
    "css", "js", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "map",
];

pub struct AccessGate {
    sessions: SessionStore,
    timeout: Duration,
}

struct GuardCtx {
    session: Option<(String, StoredSession)>,
}

impl AccessGate {
    /// Gate with the configured idle timeout (default 15 minutes).
    pub fn new(sessions: SessionStore) -> Self {
        Self::with_timeout(sessions, Duration::seconds(*SESSION_IDLE_TIMEOUT as i64))
    }

    /// Gate with an explicit idle timeout policy.
    pub fn with_timeout(sessions: SessionStore, timeout: Duration) -> Self {
        Self { sessions, timeout }
    }

    /// Whether a path bypasses authentication entirely.
    pub fn is_public_path(path: &str) -> bool {
        if PUBLIC_EXACT.contains(&path) {
            return true;
        }
        if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return true;
        }
        // Static assets are recognized by their file extension.
        path.rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext))
    }

    /// Run the guard chain for one request.
    ///
    /// For non-public paths exactly one session side effect happens: either
    /// the activity timestamp is refreshed or the session is destroyed.
    pub async fn dispatch(
        &self,
        path: &str,
        session_id: Option<&str>,
    ) -> Result<GateDecision, SessionError> {
        let mut ctx = GuardCtx { session: None };

        for guard in GUARD_ORDER {
            let verdict = match guard {
                Guard::PublicPath => Self::public_path_guard(path),
                Guard::SessionPresence => self.session_presence_guard(session_id, &mut ctx).await?,
                Guard::IdleTimeout => self.idle_timeout_guard(&mut ctx).await?,
            };
            if let Verdict::Decide(decision) = verdict {
                return Ok(decision);
            }
        }

        // Deny by default if no guard decided.
        Ok(GateDecision::RedirectToLogin)
    }

    fn public_path_guard(path: &str) -> Verdict {
        if Self::is_public_path(path) {
            Verdict::Decide(GateDecision::Allow(None))
        } else {
            Verdict::Next
        }
    }

    async fn session_presence_guard(
        &self,
        session_id: Option<&str>,
        ctx: &mut GuardCtx,
    ) -> Result<Verdict, SessionError> {
        let Some(session_id) = session_id else {
            return Ok(Verdict::Decide(GateDecision::RedirectToLogin));
        };

        match self.sessions.get(session_id).await? {
            Some(stored) => {
                ctx.session = Some((session_id.to_string(), stored));
                Ok(Verdict::Next)
            }
            None => Ok(Verdict::Decide(GateDecision::RedirectToLogin)),
        }
    }

    async fn idle_timeout_guard(&self, ctx: &mut GuardCtx) -> Result<Verdict, SessionError> {
        let Some((session_id, stored)) = ctx.session.take() else {
            return Ok(Verdict::Decide(GateDecision::RedirectToLogin));
        };

        let now = Utc::now();
        // A session without an activity timestamp has no idle time yet.
        let idle = stored
            .last_activity
            .map(|t| now - t)
            .unwrap_or_else(Duration::zero);

        if idle > self.timeout {
            tracing::debug!("Session idle for {}s, destroying", idle.num_seconds());
            // Fail open: the redirect must happen even if the destroy errors,
            // otherwise the client is stuck with a dead session.
            if let Err(e) = self.sessions.destroy(&session_id).await {
                tracing::error!("Failed to destroy timed-out session: {}", e);
            }
            return Ok(Verdict::Decide(GateDecision::RedirectToLogin));
        }

        let user = stored.user.clone();
        self.sessions.touch(&session_id, stored, now).await?;
        Ok(Verdict::Decide(GateDecision::Allow(Some(user))))
    }
}

/// Authorization failure from the role gate. The two outcomes are distinct
/// and map to different response codes (401 vs 403).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleGateError {
    #[error("You must be logged in to access this page.")]
    Unauthenticated,

    #[error("Access denied. Admin privileges required.")]
    Forbidden,
}

/// Admin-only check: passes iff a session identity exists and its role is
/// admin.
pub fn require_admin(user: Option<&SessionUser>) -> Result<&SessionUser, RoleGateError> {
    match user {
        None => Err(RoleGateError::Unauthenticated),
        Some(user) if !user.is_admin() => Err(RoleGateError::Forbidden),
        Some(user) => Ok(user),
    }
}

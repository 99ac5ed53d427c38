//! Access-gate middleware: one dispatch per request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;

use hellostore_auth::{GateDecision, get_session_id_from_headers};

use crate::error::error_page;
use crate::extract::{CurrentUser, SessionId};
use crate::state::AppState;

/// Where the gate sends requests that need a (fresh) login.
pub const LOGIN_REDIRECT: &str = "/login?expired=1";

pub async fn access_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let session_id = match get_session_id_from_headers(req.headers()) {
        Ok(id) => id.map(str::to_string),
        Err(e) => {
            tracing::error!("Failed to read session cookie: {}", e);
            None
        }
    };

    match state.gate.dispatch(&path, session_id.as_deref()).await {
        Ok(GateDecision::Allow(user)) => {
            if let Some(user) = user {
                req.extensions_mut().insert(CurrentUser(user));
                if let Some(id) = session_id {
                    req.extensions_mut().insert(SessionId(id));
                }
            }
            next.run(req).await
        }
        Ok(GateDecision::RedirectToLogin) => Redirect::to(LOGIN_REDIRECT).into_response(),
        Err(e) => {
            tracing::error!("Access gate failed: {}", e);
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong.",
                Some(e.to_string()),
            )
        }
    }
}

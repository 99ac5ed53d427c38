use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;

use hellostore_auth::{AuthFlowError, SESSION_COOKIE_NAME, header_set_cookie};

use crate::error::PageError;
use crate::extract::SessionId;
use crate::state::AppState;

/// Destroy the session and expire the cookie.
///
/// A store failure surfaces as an error page; the user is never shown a
/// logged-out screen while the session silently lives on.
pub(crate) async fn logout(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
) -> Result<Response, PageError> {
    state.flow.logout(&session_id).await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, SESSION_COOKIE_NAME.as_str(), "", -86400)
        .map_err(|e| PageError::Flow(AuthFlowError::Utils(e)))?;

    Ok((headers, Redirect::to("/login")).into_response())
}

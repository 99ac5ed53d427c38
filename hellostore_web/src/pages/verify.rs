use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use http::StatusCode;

use hellostore_auth::AuthFlowError;

use crate::error::PageError;
use crate::state::AppState;

use super::{MessageTemplate, render};

pub(crate) async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, PageError> {
    match state.flow.verify_email(&token).await {
        Ok(()) => Ok(render(&MessageTemplate {
            heading: "Email verified!".to_string(),
            body: "Your account is now active.".to_string(),
            link_href: "/login".to_string(),
            link_text: "Proceed to Login".to_string(),
        })?
        .into_response()),
        Err(err @ (AuthFlowError::TokenNotFound | AuthFlowError::TokenExpired)) => {
            let page = render(&MessageTemplate {
                heading: "Verification failed".to_string(),
                body: err.to_string(),
                link_href: "/register".to_string(),
                link_text: "Back to Registration".to_string(),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

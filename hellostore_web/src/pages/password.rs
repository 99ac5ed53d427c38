use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Deserialize;

use hellostore_auth::AuthFlowError;

use crate::error::PageError;
use crate::state::AppState;

use super::{MessageTemplate, render};

#[derive(Template)]
#[template(path = "password_forgot.j2")]
struct ForgotTemplate {}

#[derive(Template)]
#[template(path = "password_reset.j2")]
struct ResetTemplate {
    token: String,
    message: String,
    errors: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct ForgotForm {
    email: String,
}

#[derive(Deserialize)]
pub(crate) struct ResetForm {
    password: String,
}

pub(crate) async fn forgot_form() -> Result<Response, PageError> {
    Ok(render(&ForgotTemplate {})?.into_response())
}

pub(crate) async fn forgot_submit(
    State(state): State<AppState>,
    Form(form): Form<ForgotForm>,
) -> Result<Response, PageError> {
    state.flow.forgot_password(&form.email).await?;

    // The acknowledgement is identical whether or not the account exists.
    Ok(render(&MessageTemplate {
        heading: "Check your email".to_string(),
        body: "If an account exists for that address, a password reset link is on its way."
            .to_string(),
        link_href: "/login".to_string(),
        link_text: "Back to Login".to_string(),
    })?
    .into_response())
}

pub(crate) async fn reset_form(Path(token): Path<String>) -> Result<Response, PageError> {
    Ok(render(&ResetTemplate {
        token,
        message: String::new(),
        errors: Vec::new(),
    })?
    .into_response())
}

pub(crate) async fn reset_submit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetForm>,
) -> Result<Response, PageError> {
    match state.flow.reset_password(&token, &form.password).await {
        Ok(()) => Ok(render(&MessageTemplate {
            heading: "Password updated".to_string(),
            body: "You can now log in with your new password.".to_string(),
            link_href: "/login".to_string(),
            link_text: "Proceed to Login".to_string(),
        })?
        .into_response()),
        Err(AuthFlowError::WeakPassword(rules)) => {
            let page = render(&ResetTemplate {
                token,
                message: String::new(),
                errors: rules.iter().map(|r| r.to_string()).collect(),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err @ AuthFlowError::TokenNotFound) => {
            let page = render(&MessageTemplate {
                heading: "Reset failed".to_string(),
                body: err.to_string(),
                link_href: "/password/forgot".to_string(),
                link_text: "Request a new link".to_string(),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

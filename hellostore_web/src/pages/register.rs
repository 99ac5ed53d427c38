use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use hellostore_auth::{AuthFlowError, RegisterRequest};

use crate::error::PageError;
use crate::state::AppState;

use super::{MessageTemplate, client_ip, render};

#[derive(Template)]
#[template(path = "register.j2")]
struct RegisterTemplate {
    message: String,
    errors: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    #[serde(rename = "cf-turnstile-response")]
    turnstile_token: Option<String>,
}

pub(crate) async fn register_form() -> Result<Response, PageError> {
    Ok(render(&RegisterTemplate {
        message: String::new(),
        errors: Vec::new(),
    })?
    .into_response())
}

pub(crate) async fn register_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let request = RegisterRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        password: form.password,
        challenge_token: form.turnstile_token,
        remote_ip: client_ip(&headers),
    };

    match state.flow.register(request).await {
        Ok(_user) => Ok(render(&MessageTemplate {
            heading: "Registration Successful!".to_string(),
            body: "We sent you a verification email. The link is valid for one hour."
                .to_string(),
            link_href: "/login".to_string(),
            link_text: "Proceed to Login".to_string(),
        })?
        .into_response()),
        Err(AuthFlowError::WeakPassword(rules)) => {
            let page = render(&RegisterTemplate {
                message: String::new(),
                errors: rules.iter().map(|r| r.to_string()).collect(),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err @ (AuthFlowError::DuplicateEmail | AuthFlowError::ChallengeFailed)) => {
            let page = render(&RegisterTemplate {
                message: err.to_string(),
                errors: Vec::new(),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use serde::Deserialize;

use hellostore_auth::{
    AuthFlowError, LoginRequest, SESSION_COOKIE_NAME, SESSION_IDLE_TIMEOUT, header_set_cookie,
};

use crate::error::PageError;
use crate::state::AppState;

use super::{client_ip, render};

#[derive(Template)]
#[template(path = "login.j2")]
struct LoginTemplate {
    message: String,
    expired: bool,
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    expired: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
    #[serde(rename = "cf-turnstile-response")]
    turnstile_token: Option<String>,
}

pub(crate) async fn login_form(Query(query): Query<LoginQuery>) -> Result<Response, PageError> {
    Ok(render(&LoginTemplate {
        message: String::new(),
        expired: query.expired.is_some(),
    })?
    .into_response())
}

pub(crate) async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let request = LoginRequest {
        email: form.email,
        password: form.password,
        challenge_token: form.turnstile_token,
        remote_ip: client_ip(&headers),
    };

    match state.flow.login(request).await {
        Ok((session_id, _user)) => {
            let mut response_headers = HeaderMap::new();
            header_set_cookie(
                &mut response_headers,
                SESSION_COOKIE_NAME.as_str(),
                &session_id,
                *SESSION_IDLE_TIMEOUT as i64,
            )
            .map_err(|e| PageError::Flow(AuthFlowError::Utils(e)))?;

            Ok((response_headers, Redirect::to("/dashboard")).into_response())
        }
        Err(err) if err.is_user_facing() => {
            // One distinct message per failed check, nothing more.
            let page = render(&LoginTemplate {
                message: err.to_string(),
                expired: false,
            })?;
            Ok(page.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

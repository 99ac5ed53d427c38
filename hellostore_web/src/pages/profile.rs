use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use hellostore_auth::AuthFlowError;

use crate::error::PageError;
use crate::extract::CurrentUser;
use crate::state::AppState;

use super::render;

#[derive(Template)]
#[template(path = "profile.j2")]
struct ProfileTemplate {
    first_name: String,
    last_name: String,
    email: String,
    address: String,
    contact_number: String,
    updated: bool,
}

#[derive(Deserialize)]
pub(crate) struct ProfileQuery {
    updated: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ProfileForm {
    address: Option<String>,
    contact_number: Option<String>,
}

pub(crate) async fn profile_form(
    State(state): State<AppState>,
    CurrentUser(session_user): CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Response, PageError> {
    // Read the record fresh rather than trusting the session snapshot.
    let user = state
        .users
        .find_by_external_id(&session_user.external_id)
        .await
        .map_err(AuthFlowError::from)?
        .ok_or_else(|| {
            PageError::Flow(AuthFlowError::ResourceNotFound {
                resource_type: "User".to_string(),
                resource_id: session_user.external_id.clone(),
            })
        })?;

    Ok(render(&ProfileTemplate {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        address: user.address.unwrap_or_default(),
        contact_number: user.contact_number.unwrap_or_default(),
        updated: query.updated.is_some(),
    })?
    .into_response())
}

pub(crate) async fn profile_submit(
    State(state): State<AppState>,
    CurrentUser(session_user): CurrentUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, PageError> {
    let address = form.address.unwrap_or_default();
    let contact_number = form.contact_number.unwrap_or_default();

    state
        .flow
        .update_profile(&session_user, &address, &contact_number)
        .await?;

    Ok(Redirect::to("/profile?updated=1").into_response())
}

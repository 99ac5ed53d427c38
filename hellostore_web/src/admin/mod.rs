//! Admin panel: user listing and record mutations, all behind the role gate.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use http::StatusCode;
use serde::Deserialize;
use std::str::FromStr;

use hellostore_auth::{Role, UserOverview, require_admin};

use crate::error::{PageError, error_page};
use crate::extract::CurrentUser;
use crate::pages::render;
use crate::state::AppState;

/// Template-friendly row for the user tables.
struct UserRowView {
    external_id: String,
    name: String,
    email: String,
    role: String,
    status: String,
    created: String,
    is_self: bool,
}

impl UserRowView {
    fn new(overview: &UserOverview, acting_external_id: &str) -> Self {
        Self {
            external_id: overview.external_id.clone(),
            name: format!("{} {}", overview.first_name, overview.last_name),
            email: overview.email.clone(),
            role: overview.role.to_string(),
            status: overview.state_label.to_string(),
            created: overview.created_at.format("%Y-%m-%d %H:%M").to_string(),
            is_self: overview.external_id == acting_external_id,
        }
    }
}

#[derive(Template)]
#[template(path = "admin.j2")]
struct AdminHomeTemplate {
    admin_name: String,
    total_users: usize,
}

#[derive(Template)]
#[template(path = "admin_users.j2")]
struct UserListTemplate {
    users: Vec<UserRowView>,
}

#[derive(Template)]
#[template(path = "admin_edit.j2")]
struct EditUserTemplate {
    external_id: String,
    name: String,
    email: String,
    role: String,
    status: String,
}

pub(crate) async fn admin_home(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    let admin = require_admin(Some(&user))?;

    let users = state.flow.list_users(admin).await?;
    render(&AdminHomeTemplate {
        admin_name: format!("{} {}", admin.first_name, admin.last_name),
        total_users: users.len(),
    })
}

pub(crate) async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, PageError> {
    let admin = require_admin(Some(&user))?;

    let users = state.flow.list_users(admin).await?;
    render(&UserListTemplate {
        users: users
            .iter()
            .map(|u| UserRowView::new(u, &admin.external_id))
            .collect(),
    })
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(external_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let admin = require_admin(Some(&user))?;

    let overview = state.flow.get_user_admin(admin, &external_id).await?;
    render(&EditUserTemplate {
        external_id: overview.external_id.clone(),
        name: format!("{} {}", overview.first_name, overview.last_name),
        email: overview.email.clone(),
        role: overview.role.to_string(),
        status: overview.state_label.to_string(),
    })
}

#[derive(Deserialize)]
pub(crate) struct EditUserForm {
    role: String,
    status: String,
}

pub(crate) async fn edit_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(external_id): Path<String>,
    Form(form): Form<EditUserForm>,
) -> Result<Response, PageError> {
    let admin = require_admin(Some(&user))?;

    let Ok(role) = Role::from_str(&form.role) else {
        return Ok(error_page(StatusCode::BAD_REQUEST, "Invalid role.", None));
    };
    let active = match form.status.as_str() {
        "active" => true,
        "inactive" => false,
        _ => {
            return Ok(error_page(
                StatusCode::BAD_REQUEST,
                "Invalid account status.",
                None,
            ));
        }
    };

    state
        .flow
        .update_user_admin(admin, &external_id, role, active)
        .await?;

    Ok(Redirect::to("/list").into_response())
}

pub(crate) async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(external_id): Path<String>,
) -> Result<Response, PageError> {
    let admin = require_admin(Some(&user))?;

    state.flow.delete_user_admin(admin, &external_id).await?;

    Ok(Redirect::to("/list").into_response())
}

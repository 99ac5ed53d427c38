use askama::Template;
use axum::response::Html;

use crate::error::PageError;
use crate::extract::CurrentUser;

use super::render;

#[derive(Template)]
#[template(path = "dashboard.j2")]
struct DashboardTemplate {
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    is_admin: bool,
}

pub(crate) async fn dashboard(CurrentUser(user): CurrentUser) -> Result<Html<String>, PageError> {
    render(&DashboardTemplate {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        is_admin: user.is_admin(),
    })
}

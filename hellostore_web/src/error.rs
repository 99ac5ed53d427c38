//! Error responses: rendered pages for the site, JSON under /api/.

use askama::Template;
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use hellostore_auth::{AuthFlowError, RoleGateError, is_production};

#[derive(Template)]
#[template(path = "error.j2")]
struct ErrorTemplate {
    status: u16,
    message: String,
    detail: String,
}

/// Render an error page with the given status. `detail` is only shown
/// outside production.
pub fn error_page(status: StatusCode, message: &str, detail: Option<String>) -> Response {
    let template = ErrorTemplate {
        status: status.as_u16(),
        message: message.to_string(),
        detail: if is_production() {
            String::new()
        } else {
            detail.unwrap_or_default()
        },
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.").into_response()
        }
    }
}

/// Errors bubbling out of page handlers.
#[derive(Debug)]
pub enum PageError {
    Flow(AuthFlowError),
    Role(RoleGateError),
    Render(askama::Error),
}

impl From<AuthFlowError> for PageError {
    fn from(err: AuthFlowError) -> Self {
        Self::Flow(err)
    }
}

impl From<RoleGateError> for PageError {
    fn from(err: RoleGateError) -> Self {
        Self::Role(err)
    }
}

impl From<askama::Error> for PageError {
    fn from(err: askama::Error) -> Self {
        Self::Render(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Flow(err) => {
                let status = match &err {
                    AuthFlowError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
                    AuthFlowError::SelfDeletionForbidden | AuthFlowError::Forbidden => {
                        StatusCode::FORBIDDEN
                    }
                    e if e.is_user_facing() => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal error: {}", err);
                    error_page(status, "Something went wrong.", Some(err.to_string()))
                } else {
                    error_page(status, &err.to_string(), None)
                }
            }
            PageError::Role(err) => {
                let status = match err {
                    RoleGateError::Unauthenticated => StatusCode::UNAUTHORIZED,
                    RoleGateError::Forbidden => StatusCode::FORBIDDEN,
                };
                error_page(status, &err.to_string(), None)
            }
            PageError::Render(err) => {
                tracing::error!("Template rendering failed: {}", err);
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong.",
                    Some(err.to_string()),
                )
            }
        }
    }
}

/// Fallback for unmatched paths: JSON under /api/, a rendered page otherwise.
pub async fn fallback_404(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not Found", "path": uri.path() })),
        )
            .into_response()
    } else {
        error_page(StatusCode::NOT_FOUND, "Page not found.", None)
    }
}

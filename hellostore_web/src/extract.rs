use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use http::StatusCode;

use hellostore_auth::SessionUser;

use crate::error::error_page;

/// Session snapshot of the authenticated user, inserted by the access-gate
/// middleware and available as an extractor in gated handlers.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub SessionUser);

/// Session id of the current request, inserted alongside `CurrentUser`.
#[derive(Clone, Debug)]
pub struct SessionId(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            error_page(
                StatusCode::UNAUTHORIZED,
                "You must be logged in to access this page.",
                None,
            )
        })
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<SessionId>().cloned().ok_or_else(|| {
            error_page(
                StatusCode::UNAUTHORIZED,
                "You must be logged in to access this page.",
                None,
            )
        })
    }
}

//! Site pages: public storefront entry points and the gated user pages.

mod dashboard;
mod login;
mod logout;
mod password;
mod profile;
mod register;
mod verify;

pub(crate) use dashboard::dashboard;
pub(crate) use login::{login_form, login_submit};
pub(crate) use logout::logout;
pub(crate) use password::{forgot_form, forgot_submit, reset_form, reset_submit};
pub(crate) use profile::{profile_form, profile_submit};
pub(crate) use register::{register_form, register_submit};
pub(crate) use verify::verify_email;

use askama::Template;
use axum::response::Html;
use http::HeaderMap;

use crate::error::PageError;

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, PageError> {
    Ok(Html(template.render()?))
}

/// Best-effort client address for the human-challenge verifier.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Template)]
#[template(path = "index.j2")]
struct IndexTemplate {}

pub(crate) async fn index() -> Result<Html<String>, PageError> {
    render(&IndexTemplate {})
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

/// Generic single-message page used for registration, verification and
/// password-reset outcomes.
#[derive(Template)]
#[template(path = "message.j2")]
pub(crate) struct MessageTemplate {
    pub heading: String,
    pub body: String,
    pub link_href: String,
    pub link_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_first_forwarded_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().expect("header"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_absent() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_message_template_renders() {
        let t = MessageTemplate {
            heading: "Registration Successful!".to_string(),
            body: "Check your email.".to_string(),
            link_href: "/login".to_string(),
            link_text: "Proceed to Login".to_string(),
        };
        let html = t.render().expect("render");
        assert!(html.contains("Registration Successful!"));
        assert!(html.contains("/login"));
    }
}

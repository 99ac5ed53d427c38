use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::fallback_404;
use crate::state::AppState;
use crate::{admin, middleware as gate_middleware, pages, static_files};

/// Build the site router with the access gate applied to every route.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/register", get(pages::register_form).post(pages::register_submit))
        .route("/verify/{token}", get(pages::verify_email))
        .route("/login", get(pages::login_form).post(pages::login_submit))
        .route("/logout", get(pages::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile_form).post(pages::profile_submit))
        .route(
            "/password/forgot",
            get(pages::forgot_form).post(pages::forgot_submit),
        )
        .route(
            "/password/reset/{token}",
            get(pages::reset_form).post(pages::reset_submit),
        )
        .route("/admin", get(admin::admin_home))
        .route("/list", get(admin::list_users))
        .route("/edit/{id}", get(admin::edit_form).post(admin::edit_submit))
        .route("/delete/{id}", post(admin::delete_user))
        .route("/healthz", get(pages::healthz))
        .route("/static/style.css", get(static_files::serve_style_css))
        .fallback(fallback_404)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate_middleware::access_gate,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

use std::sync::Arc;

use hellostore_auth::{AccessGate, AuthFlow, SessionStore, UserStore};

/// Application state carrying the explicitly injected stores and services.
#[derive(Clone)]
pub struct AppState {
    pub flow: AuthFlow,
    pub gate: Arc<AccessGate>,
    pub sessions: SessionStore,
    pub users: UserStore,
}

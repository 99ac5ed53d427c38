use std::env;
use std::sync::Arc;

use dotenvy::dotenv;

use hellostore_auth::{
    AccessGate, AuthFlow, ChallengeVerifier, ResetTokenService, SessionStore, UserStore,
    build_cache_store, build_data_store, mailer_from_env,
};
use hellostore_web::{AppState, app_router, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    server::init_tracing(env!("CARGO_CRATE_NAME"));

    let data_kind = env::var("DATA_STORE_TYPE").unwrap_or_else(|_| "sqlite".to_string());
    let data_url = env::var("DATA_STORE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let cache_kind = env::var("CACHE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string());
    let cache_url = env::var("CACHE_STORE_URL").ok();

    let data_store = build_data_store(&data_kind, &data_url)?;
    let cache_store = build_cache_store(&cache_kind, cache_url.as_deref()).await?;

    let users = UserStore::new(data_store);
    users.init().await?;

    let sessions = SessionStore::new(cache_store.clone());
    let reset_tokens = ResetTokenService::new(cache_store);
    let challenge = ChallengeVerifier::from_env();
    let mailer = Arc::from(mailer_from_env());

    let flow = AuthFlow::new(
        users.clone(),
        sessions.clone(),
        reset_tokens,
        challenge,
        mailer,
    );
    let gate = Arc::new(AccessGate::new(sessions.clone()));

    let state = AppState {
        flow,
        gate,
        sessions,
        users,
    };

    let app = app_router(state);

    let port = env::var("HOST_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    server::serve_http(port, app).await?;
    Ok(())
}

//! hellostore-auth - account, session and access-control core for the
//! HelloStore web shop.
//!
//! This crate is framework-agnostic: the web layer passes request data in
//! and renders the decisions and errors coming back. Store handles are
//! injected explicitly; only policy configuration is read from the
//! environment.

mod challenge;
mod config;
mod email;
mod flow;
mod gate;
mod password;
mod session;
mod storage;
mod token;
mod userdb;
mod utils;

pub use challenge::ChallengeVerifier;
pub use config::{
    APP_ENV, BASE_URL, PASSWORD_RESET_TOKEN_TTL, SESSION_COOKIE_NAME, SESSION_IDLE_TIMEOUT,
    VERIFICATION_TOKEN_TTL, is_production,
};
pub use email::{ConsoleMailer, MailError, Mailer, SmtpConfig, SmtpMailer, mailer_from_env};
pub use flow::{AuthFlow, AuthFlowError, LoginRequest, RegisterRequest, UserOverview};
pub use gate::{AccessGate, GateDecision, RoleGateError, require_admin};
pub use password::{
    PasswordError, PasswordRule, hash_password, validate_password_policy, verify_password,
};
pub use session::{
    SessionError, SessionStore, SessionUser, StoredSession, get_session_id_from_headers,
};
pub use storage::{
    CacheStore, DataStore, SharedCacheStore, SharedDataStore, StorageError, build_cache_store,
    build_data_store,
};
pub use token::ResetTokenService;
pub use userdb::{AccountState, Role, User, UserError, UserStore, normalize_email};
pub use utils::{UtilError, gen_random_string, header_set_cookie};

//! End-to-end tests of the account lifecycle against in-memory stores.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serial_test::serial;

use hellostore_auth::{
    AccessGate, AccountState, AuthFlow, AuthFlowError, ChallengeVerifier, GateDecision,
    LoginRequest, MailError, Mailer, RegisterRequest, ResetTokenService, Role, SessionStore,
    SessionUser, User, UserStore, build_cache_store, build_data_store, gen_random_string,
};

/// Mailer that records outbound messages for inspection.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock").push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

/// Mailer that always fails, for the dispatch-failure path.
struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _: &str, _: &str, _: &str) -> Result<(), MailError> {
        Err(MailError::Transport("smtp connection refused".to_string()))
    }
}

struct TestEnv {
    flow: AuthFlow,
    users: UserStore,
    sessions: SessionStore,
    mailer: Arc<RecordingMailer>,
}

async fn test_env_with_mailer(mailer: Arc<dyn Mailer>) -> (AuthFlow, UserStore, SessionStore) {
    let data = build_data_store("sqlite", "sqlite::memory:").expect("data store");
    let cache = build_cache_store("memory", None).await.expect("cache store");

    let users = UserStore::new(data);
    users.init().await.expect("init tables");

    let sessions = SessionStore::new(cache.clone());
    let reset_tokens = ResetTokenService::new(cache);
    let challenge = ChallengeVerifier::new(None, "http://localhost/unused".to_string());

    let flow = AuthFlow::new(
        users.clone(),
        sessions.clone(),
        reset_tokens,
        challenge,
        mailer,
    );
    (flow, users, sessions)
}

async fn test_env() -> TestEnv {
    let mailer = Arc::new(RecordingMailer::default());
    let (flow, users, sessions) = test_env_with_mailer(mailer.clone()).await;
    TestEnv {
        flow,
        users,
        sessions,
        mailer,
    }
}

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        challenge_token: None,
        remote_ip: None,
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        challenge_token: None,
        remote_ip: None,
    }
}

fn pending_token(user: &User) -> String {
    match &user.state {
        AccountState::PendingVerification { token, .. } => token.clone(),
        other => panic!("Expected pending state, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn register_creates_pending_user_and_sends_email() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");

    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.role, Role::Customer);
    assert!(matches!(
        user.state,
        AccountState::PendingVerification { .. }
    ));

    let sent = env.mailer.sent.lock().expect("mailer lock");
    assert_eq!(sent.len(), 1);
    let (to, _subject, body) = &sent[0];
    assert_eq!(to, "a@x.com");
    assert!(body.contains(&format!("/verify/{}", pending_token(&user))));
}

#[tokio::test]
#[serial]
async fn register_reports_every_unmet_password_rule() {
    let env = test_env().await;

    // "short" misses length, uppercase, digit and symbol.
    let err = env
        .flow
        .register(register_request("a@x.com", "short"))
        .await
        .expect_err("weak password");

    match err {
        AuthFlowError::WeakPassword(rules) => assert_eq!(rules.len(), 4),
        other => panic!("Expected WeakPassword, got {other:?}"),
    }

    // Nothing was persisted.
    assert!(
        env.users
            .find_by_email("a@x.com")
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn duplicate_email_is_rejected_case_insensitively() {
    let env = test_env().await;

    env.flow
        .register(register_request("A@X.com", "Password1!"))
        .await
        .expect("first registration");

    let err = env
        .flow
        .register(register_request("  a@x.COM ", "Password1!"))
        .await
        .expect_err("second registration");

    assert!(matches!(err, AuthFlowError::DuplicateEmail));
}

#[tokio::test]
#[serial]
async fn failed_challenge_short_circuits_before_any_database_access() {
    // A configured secret with an unreachable verifier rejects everything.
    let mailer = Arc::new(RecordingMailer::default());
    let data = build_data_store("sqlite", "sqlite::memory:").expect("data store");
    let cache = build_cache_store("memory", None).await.expect("cache store");
    let users = UserStore::new(data);
    users.init().await.expect("init tables");
    let sessions = SessionStore::new(cache.clone());
    let flow = AuthFlow::new(
        users.clone(),
        sessions,
        ResetTokenService::new(cache),
        ChallengeVerifier::new(
            Some("secret".to_string()),
            "http://127.0.0.1:9/siteverify".to_string(),
        ),
        mailer,
    );

    let err = flow
        .register(register_request("probe@x.com", "Password1!"))
        .await
        .expect_err("challenge must fail");
    assert!(matches!(err, AuthFlowError::ChallengeFailed));

    // The email cannot be probed through failed registrations.
    assert!(
        users
            .find_by_email("probe@x.com")
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn email_dispatch_failure_does_not_roll_back_the_record() {
    let (flow, users, _sessions) = test_env_with_mailer(Arc::new(FailingMailer)).await;

    let err = flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect_err("mail failure surfaces");
    assert!(matches!(err, AuthFlowError::Mail(_)));

    // The user exists even though the verification mail never went out.
    assert!(
        users
            .find_by_email("a@x.com")
            .await
            .expect("lookup")
            .is_some()
    );
}

#[tokio::test]
#[serial]
async fn verify_with_expired_token_fails_even_if_it_matches() {
    let env = test_env().await;

    let token = gen_random_string(32).expect("token");
    let user = User::new_pending(
        "u-1".to_string(),
        "ext-1".to_string(),
        "Ada".to_string(),
        "Lovelace".to_string(),
        "a@x.com".to_string(),
        "$argon2id$v=19$m=19456,t=2,p=1$YWJjZGVmZ2g$YWJjZGVmZ2g".to_string(),
        token.clone(),
        Utc::now() - Duration::seconds(1),
    );
    env.users.insert(&user).await.expect("insert");

    let err = env.flow.verify_email(&token).await.expect_err("expired");
    assert!(matches!(err, AuthFlowError::TokenExpired));

    // The record is still unverified.
    let stored = env
        .users
        .find_by_email("a@x.com")
        .await
        .expect("lookup")
        .expect("present");
    assert!(matches!(
        stored.state,
        AccountState::PendingVerification { .. }
    ));
}

#[tokio::test]
#[serial]
async fn verify_never_succeeds_twice_for_the_same_token() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    let token = pending_token(&user);

    env.flow.verify_email(&token).await.expect("first verify");

    let err = env
        .flow
        .verify_email(&token)
        .await
        .expect_err("second verify");
    assert!(matches!(err, AuthFlowError::TokenNotFound));
}

#[tokio::test]
#[serial]
async fn unknown_verification_token_is_rejected() {
    let env = test_env().await;
    let err = env
        .flow
        .verify_email("no-such-token")
        .await
        .expect_err("unknown token");
    assert!(matches!(err, AuthFlowError::TokenNotFound));
}

#[tokio::test]
#[serial]
async fn login_checks_existence_before_anything_else() {
    let env = test_env().await;

    let err = env
        .flow
        .login(login_request("nobody@x.com", "whatever"))
        .await
        .expect_err("unknown email");
    assert!(matches!(err, AuthFlowError::UserNotFound));
}

#[tokio::test]
#[serial]
async fn login_checks_status_before_credentials() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");
    env.users
        .update_role_status(&user.external_id, Role::Customer, "inactive")
        .await
        .expect("deactivate");

    // Wrong password AND inactive account: the status message wins.
    let err = env
        .flow
        .login(login_request("a@x.com", "wrong-password"))
        .await
        .expect_err("inactive");
    assert!(matches!(err, AuthFlowError::AccountInactive));
}

#[tokio::test]
#[serial]
async fn login_checks_verification_before_credentials() {
    let env = test_env().await;

    env.flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");

    let err = env
        .flow
        .login(login_request("a@x.com", "wrong-password"))
        .await
        .expect_err("unverified");
    assert!(matches!(err, AuthFlowError::EmailNotVerified));
}

#[tokio::test]
#[serial]
async fn full_lifecycle_register_verify_login() {
    let env = test_env().await;

    // Register: the account is pending.
    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");

    // Login before verification fails with the dedicated message.
    let err = env
        .flow
        .login(login_request("a@x.com", "Password1!"))
        .await
        .expect_err("unverified login");
    assert!(matches!(err, AuthFlowError::EmailNotVerified));

    // Verify: the account becomes active.
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");
    let stored = env
        .users
        .find_by_email("a@x.com")
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.state, AccountState::Active);

    // Login now opens a session holding the snapshot.
    let (session_id, snapshot) = env
        .flow
        .login(login_request("a@x.com", "Password1!"))
        .await
        .expect("login");
    assert_eq!(snapshot.email, "a@x.com");
    assert!(snapshot.is_email_verified);

    let session = env
        .sessions
        .get(&session_id)
        .await
        .expect("get")
        .expect("session exists");
    assert_eq!(session.user.external_id, user.external_id);
    assert!(session.last_activity.is_some());
}

#[tokio::test]
#[serial]
async fn wrong_password_for_active_account_is_invalid_credentials() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");

    let err = env
        .flow
        .login(login_request("a@x.com", "Password2!"))
        .await
        .expect_err("wrong password");
    assert!(matches!(err, AuthFlowError::InvalidCredentials));
}

#[tokio::test]
#[serial]
async fn logout_destroys_the_session() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");
    let (session_id, _) = env
        .flow
        .login(login_request("a@x.com", "Password1!"))
        .await
        .expect("login");

    env.flow.logout(&session_id).await.expect("logout");
    assert!(env.sessions.get(&session_id).await.expect("get").is_none());
}

#[tokio::test]
#[serial]
async fn idle_session_is_destroyed_on_the_next_protected_request() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");
    let (session_id, _) = env
        .flow
        .login(login_request("a@x.com", "Password1!"))
        .await
        .expect("login");

    // lastActivity 16 minutes ago, threshold 15 minutes.
    let mut stored = env
        .sessions
        .get(&session_id)
        .await
        .expect("get")
        .expect("present");
    stored.last_activity = Some(Utc::now() - Duration::minutes(16));
    env.sessions.put(&session_id, stored).await.expect("backdate");

    let gate = AccessGate::with_timeout(env.sessions.clone(), Duration::seconds(900));
    let decision = gate
        .dispatch("/dashboard", Some(&session_id))
        .await
        .expect("dispatch");

    assert_eq!(decision, GateDecision::RedirectToLogin);
    assert!(env.sessions.get(&session_id).await.expect("get").is_none());
}

fn admin_snapshot(external_id: &str) -> SessionUser {
    SessionUser {
        id: "admin-internal".to_string(),
        external_id: external_id.to_string(),
        first_name: "Root".to_string(),
        last_name: "Admin".to_string(),
        email: "admin@x.com".to_string(),
        role: Role::Admin,
        is_email_verified: true,
    }
}

#[tokio::test]
#[serial]
async fn non_admin_cannot_use_admin_operations() {
    let env = test_env().await;

    let customer = SessionUser {
        role: Role::Customer,
        ..admin_snapshot("ext-c")
    };

    let err = env
        .flow
        .list_users(&customer)
        .await
        .expect_err("customer listing users");
    assert!(matches!(err, AuthFlowError::Forbidden));
}

#[tokio::test]
#[serial]
async fn admin_cannot_delete_their_own_record() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("admin@x.com", "Password1!"))
        .await
        .expect("register");
    env.users
        .update_role_status(&user.external_id, Role::Admin, "active")
        .await
        .expect("promote");

    let acting = admin_snapshot(&user.external_id);
    let err = env
        .flow
        .delete_user_admin(&acting, &user.external_id)
        .await
        .expect_err("self deletion");
    assert!(matches!(err, AuthFlowError::SelfDeletionForbidden));

    // The record remains.
    assert!(
        env.users
            .find_by_external_id(&user.external_id)
            .await
            .expect("lookup")
            .is_some()
    );
}

#[tokio::test]
#[serial]
async fn admin_can_delete_other_users() {
    let env = test_env().await;

    let victim = env
        .flow
        .register(register_request("victim@x.com", "Password1!"))
        .await
        .expect("register");

    let acting = admin_snapshot("ext-admin");
    env.flow
        .delete_user_admin(&acting, &victim.external_id)
        .await
        .expect("delete");

    assert!(
        env.users
            .find_by_external_id(&victim.external_id)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn password_reset_round_trip() {
    let env = test_env().await;

    let user = env
        .flow
        .register(register_request("a@x.com", "Password1!"))
        .await
        .expect("register");
    env.flow
        .verify_email(&pending_token(&user))
        .await
        .expect("verify");

    env.flow.forgot_password("a@x.com").await.expect("forgot");

    // The reset link is in the second recorded email.
    let token = {
        let sent = env.mailer.sent.lock().expect("mailer lock");
        let (_, _, body) = sent.last().expect("reset mail");
        let marker = "/password/reset/";
        let start = body.find(marker).expect("link in body") + marker.len();
        let end = body[start..].find('"').expect("closing quote") + start;
        body[start..end].to_string()
    };

    // A weak replacement password reports all violated rules.
    let err = env
        .flow
        .reset_password(&token, "weak")
        .await
        .expect_err("weak password");
    assert!(matches!(err, AuthFlowError::WeakPassword(_)));

    // A conforming password goes through and the token is consumed.
    env.flow
        .reset_password(&token, "NewPassword2!")
        .await
        .expect("reset");
    let err = env
        .flow
        .reset_password(&token, "NewPassword2!")
        .await
        .expect_err("token reuse");
    assert!(matches!(err, AuthFlowError::TokenNotFound));

    // Old password no longer works, the new one does.
    let err = env
        .flow
        .login(login_request("a@x.com", "Password1!"))
        .await
        .expect_err("old password");
    assert!(matches!(err, AuthFlowError::InvalidCredentials));
    env.flow
        .login(login_request("a@x.com", "NewPassword2!"))
        .await
        .expect("new password");
}

#[tokio::test]
#[serial]
async fn forgot_password_is_silent_for_unknown_accounts() {
    let env = test_env().await;

    env.flow
        .forgot_password("nobody@x.com")
        .await
        .expect("silent ack");

    assert!(env.mailer.sent.lock().expect("mailer lock").is_empty());
}

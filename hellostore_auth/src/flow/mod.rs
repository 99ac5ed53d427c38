//! Auth flow controller: registration, email verification, login, logout and
//! password reset, orchestrating the credential store, session store, token
//! services and the outbound side effects.

mod admin;
mod errors;

pub use admin::UserOverview;
pub use errors::AuthFlowError;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::challenge::ChallengeVerifier;
use crate::config::BASE_URL;
use crate::email::Mailer;
use crate::password::{hash_password, validate_password_policy, verify_password};
use crate::session::{SessionStore, SessionUser};
use crate::token::{
    ResetTokenService, is_expired, issue_verification_token, tokens_match,
};
use crate::userdb::{AccountState, User, UserStore, normalize_email};
use crate::utils::gen_random_string;

/// Length in bytes of the random public identifier attached to each user.
const EXTERNAL_ID_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub challenge_token: Option<String>,
    pub remote_ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub challenge_token: Option<String>,
    pub remote_ip: Option<String>,
}

/// Orchestrates the account lifecycle over explicitly injected dependencies.
#[derive(Clone)]
pub struct AuthFlow {
    users: UserStore,
    sessions: SessionStore,
    reset_tokens: ResetTokenService,
    challenge: ChallengeVerifier,
    mailer: Arc<dyn Mailer>,
}

impl AuthFlow {
    pub fn new(
        users: UserStore,
        sessions: SessionStore,
        reset_tokens: ResetTokenService,
        challenge: ChallengeVerifier,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            sessions,
            reset_tokens,
            challenge,
            mailer,
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Register a new account, leaving it in `PendingVerification`.
    ///
    /// The human challenge runs before any database access so registration
    /// attempts cannot be used to probe which emails exist.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthFlowError> {
        if !self
            .challenge
            .verify(
                request.challenge_token.as_deref(),
                request.remote_ip.as_deref(),
            )
            .await
        {
            return Err(AuthFlowError::ChallengeFailed.log());
        }

        let email = normalize_email(&request.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthFlowError::DuplicateEmail.log());
        }

        if let Err(violations) = validate_password_policy(&request.password) {
            return Err(AuthFlowError::WeakPassword(violations).log());
        }

        let password_hash = hash_password(&request.password)?;
        let (token, token_expires_at) = issue_verification_token()?;

        let user = User::new_pending(
            Uuid::new_v4().to_string(),
            gen_random_string(EXTERNAL_ID_BYTES)?,
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            email,
            password_hash,
            token.clone(),
            token_expires_at,
        );

        self.users.insert(&user).await?;
        tracing::info!("Registered user {} ({})", user.external_id, user.email);

        // The record is already persisted; a dispatch failure surfaces to the
        // caller but is not rolled back and not retried.
        let link = format!("{}/verify/{}", BASE_URL.as_str(), token);
        self.mailer.send(
            &user.email,
            "Verify your HelloStore account",
            &verification_email_body(&user.first_name, &link),
        )?;

        Ok(user)
    }

    /// Consume a verification token, moving its owner to `Active`.
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthFlowError> {
        let user = self
            .users
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| AuthFlowError::TokenNotFound.log())?;

        let AccountState::PendingVerification {
            token: ref stored_token,
            expires_at,
        } = user.state
        else {
            return Err(AuthFlowError::TokenNotFound.log());
        };

        if !tokens_match(token, stored_token) {
            return Err(AuthFlowError::TokenNotFound.log());
        }

        if is_expired(expires_at, Utc::now()) {
            return Err(AuthFlowError::TokenExpired.log());
        }

        // Single atomic statement: flag flip and token clear never diverge.
        // A concurrent consume of the same token loses the race here.
        let consumed = self
            .users
            .consume_verification_token(token, Utc::now())
            .await?;
        if !consumed {
            return Err(AuthFlowError::TokenNotFound.log());
        }

        tracing::info!("Email verified for user {}", user.external_id);
        Ok(())
    }

    /// Authenticate and open a session.
    ///
    /// Checks run in a fixed order (existence, status, verification,
    /// credential) so no step leaks anything beyond its own message; in
    /// particular no password comparison happens for unknown emails.
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<(String, SessionUser), AuthFlowError> {
        if !self
            .challenge
            .verify(
                request.challenge_token.as_deref(),
                request.remote_ip.as_deref(),
            )
            .await
        {
            return Err(AuthFlowError::ChallengeFailed.log());
        }

        let email = normalize_email(&request.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthFlowError::UserNotFound.log())?;

        match user.state {
            AccountState::Inactive => return Err(AuthFlowError::AccountInactive.log()),
            AccountState::PendingVerification { .. } => {
                return Err(AuthFlowError::EmailNotVerified.log());
            }
            AccountState::Active => {}
        }

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthFlowError::InvalidCredentials.log());
        }

        let session_user = SessionUser::from(&user);
        let session_id = self.sessions.create(session_user.clone()).await?;

        tracing::info!("User {} logged in", user.external_id);
        Ok((session_id, session_user))
    }

    /// Destroy the session unconditionally.
    ///
    /// Unlike the timeout path this is not fail-open: a store error surfaces
    /// so the user is never silently left logged in.
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthFlowError> {
        self.sessions.destroy(session_id).await?;
        Ok(())
    }

    /// Issue a password reset token when the email belongs to an active
    /// account. Always succeeds from the caller's perspective so the
    /// acknowledgement page never reveals whether the account exists.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthFlowError> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };
        if user.state != AccountState::Active {
            tracing::debug!("Password reset requested for non-active account");
            return Ok(());
        }

        let token = self
            .reset_tokens
            .issue(&user.id)
            .await
            .map_err(|e| AuthFlowError::Storage(e.to_string()))?;

        let link = format!("{}/password/reset/{}", BASE_URL.as_str(), token);
        if let Err(e) = self.mailer.send(
            &user.email,
            "Reset your HelloStore password",
            &reset_email_body(&user.first_name, &link),
        ) {
            // Swallowed on purpose: a distinct failure page here would leak
            // account existence.
            tracing::error!("Failed to send password reset email: {}", e);
        }

        Ok(())
    }

    /// Consume a reset token and store the new password hash.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthFlowError> {
        if let Err(violations) = validate_password_policy(new_password) {
            return Err(AuthFlowError::WeakPassword(violations).log());
        }

        let user_id = self
            .reset_tokens
            .consume(token)
            .await
            .map_err(|e| AuthFlowError::Storage(e.to_string()))?
            .ok_or_else(|| AuthFlowError::TokenNotFound.log())?;

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password_hash(&user_id, &password_hash)
            .await
            .map_err(|e| match e {
                crate::userdb::UserError::NotFound => AuthFlowError::TokenNotFound.log(),
                other => AuthFlowError::from(other),
            })?;

        tracing::info!("Password reset completed");
        Ok(())
    }

    /// Update the profile fields of the acting user and return the fresh
    /// record.
    pub async fn update_profile(
        &self,
        acting: &SessionUser,
        address: &str,
        contact_number: &str,
    ) -> Result<User, AuthFlowError> {
        self.users
            .update_profile(&acting.external_id, address.trim(), contact_number.trim())
            .await?;

        self.users
            .find_by_external_id(&acting.external_id)
            .await?
            .ok_or_else(|| {
                AuthFlowError::ResourceNotFound {
                    resource_type: "User".to_string(),
                    resource_id: acting.external_id.clone(),
                }
                .log()
            })
    }
}

fn verification_email_body(first_name: &str, link: &str) -> String {
    format!(
        "<p>Hi {first_name},</p>\
         <p>Welcome to HelloStore! Please confirm your email address by \
         clicking the link below. The link is valid for one hour.</p>\
         <p><a href=\"{link}\">Verify my email</a></p>\
         <p>If you did not create this account you can ignore this message.</p>"
    )
}

fn reset_email_body(first_name: &str, link: &str) -> String {
    format!(
        "<p>Hi {first_name},</p>\
         <p>We received a request to reset your HelloStore password. The link \
         below is valid for one hour.</p>\
         <p><a href=\"{link}\">Reset my password</a></p>\
         <p>If you did not request this you can ignore this message.</p>"
    )
}

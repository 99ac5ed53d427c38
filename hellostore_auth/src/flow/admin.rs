//! Admin record mutations, all behind the role check.

use chrono::{DateTime, Utc};

use crate::session::SessionUser;
use crate::userdb::{Role, User};

use super::{AuthFlow, AuthFlowError};

/// Listing shape for the admin pages. Deliberately excludes the password
/// hash and token fields.
#[derive(Debug, Clone)]
pub struct UserOverview {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub state_label: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserOverview {
    fn from(user: &User) -> Self {
        Self {
            external_id: user.external_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            state_label: user.state.label(),
            created_at: user.created_at,
        }
    }
}

fn ensure_admin(acting: &SessionUser) -> Result<(), AuthFlowError> {
    if !acting.is_admin() {
        return Err(AuthFlowError::Forbidden.log());
    }
    Ok(())
}

impl AuthFlow {
    pub async fn list_users(
        &self,
        acting: &SessionUser,
    ) -> Result<Vec<UserOverview>, AuthFlowError> {
        ensure_admin(acting)?;

        let users = self.users().list_all().await?;
        Ok(users.iter().map(UserOverview::from).collect())
    }

    pub async fn get_user_admin(
        &self,
        acting: &SessionUser,
        external_id: &str,
    ) -> Result<UserOverview, AuthFlowError> {
        ensure_admin(acting)?;

        let user = self
            .users()
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                AuthFlowError::ResourceNotFound {
                    resource_type: "User".to_string(),
                    resource_id: external_id.to_string(),
                }
                .log()
            })?;

        Ok(UserOverview::from(&user))
    }

    /// Change a user's role and account status.
    pub async fn update_user_admin(
        &self,
        acting: &SessionUser,
        external_id: &str,
        role: Role,
        active: bool,
    ) -> Result<(), AuthFlowError> {
        ensure_admin(acting)?;

        let status = if active { "active" } else { "inactive" };
        self.users()
            .update_role_status(external_id, role, status)
            .await
            .map_err(|e| match e {
                crate::userdb::UserError::NotFound => AuthFlowError::ResourceNotFound {
                    resource_type: "User".to_string(),
                    resource_id: external_id.to_string(),
                }
                .log(),
                other => AuthFlowError::from(other),
            })?;

        tracing::info!(
            "Admin {} set user {} to role={}, status={}",
            acting.external_id,
            external_id,
            role,
            status
        );
        Ok(())
    }

    /// Delete a user record. Admins cannot delete their own record, so the
    /// last admin cannot lock themselves out mid-session.
    pub async fn delete_user_admin(
        &self,
        acting: &SessionUser,
        external_id: &str,
    ) -> Result<(), AuthFlowError> {
        ensure_admin(acting)?;

        if acting.external_id == external_id {
            return Err(AuthFlowError::SelfDeletionForbidden.log());
        }

        let user = self
            .users()
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                AuthFlowError::ResourceNotFound {
                    resource_type: "User".to_string(),
                    resource_id: external_id.to_string(),
                }
                .log()
            })?;

        self.users().delete(&user.external_id).await?;

        tracing::info!(
            "Admin {} deleted user {} ({})",
            acting.external_id,
            user.external_id,
            user.email
        );
        Ok(())
    }
}

//! User directory: login lookup and owner-side account administration.

use crate::error::LedgerError;
use crate::models::{Permissions, Role, User};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<LedgerStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    fn require_owner(actor: &User) -> Result<(), LedgerError> {
        if actor.role == Role::Owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(anyhow!(
                "User administration requires the owner role"
            )))
        }
    }

    /// Look up an account for login. Accounts still awaiting owner approval
    /// are refused.
    pub async fn find_by_email(&self, email: &str) -> Result<User, LedgerError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .ok_or_else(|| LedgerError::NotFound(anyhow!("User not found")))?;

        if !user.is_approved {
            return Err(LedgerError::Unauthorized(anyhow!(
                "Account is pending approval"
            )));
        }

        Ok(user)
    }

    pub async fn list(&self, actor: &User) -> Result<Vec<User>, LedgerError> {
        Self::require_owner(actor)?;
        Ok(self.store.list_users().await)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.email, user_id = %user_id))]
    pub async fn approve(&self, user_id: Uuid, actor: &User) -> Result<User, LedgerError> {
        Self::require_owner(actor)?;
        self.store.set_user_approved(user_id, true).await
    }

    #[instrument(skip(self, permissions, actor), fields(actor = %actor.email, user_id = %user_id))]
    pub async fn set_permissions(
        &self,
        user_id: Uuid,
        permissions: Permissions,
        actor: &User,
    ) -> Result<User, LedgerError> {
        Self::require_owner(actor)?;
        self.store.set_user_permissions(user_id, permissions).await
    }
}

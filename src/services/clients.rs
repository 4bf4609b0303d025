//! Client directory.

use crate::error::LedgerError;
use crate::models::{Client, CreateClient, UpdateClient, User};
use crate::services::permissions::{self, capabilities};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Client lookup and maintenance. The invoice ledger resolves sales
/// counterparties through this directory; `total_due` on each client is
/// maintained by the store, never by callers.
#[derive(Clone)]
pub struct ClientDirectory {
    store: Arc<LedgerStore>,
}

impl ClientDirectory {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input, actor), fields(actor = %actor.email))]
    pub async fn create(&self, input: &CreateClient, actor: &User) -> Result<Client, LedgerError> {
        permissions::require(actor, capabilities::MANAGE_CLIENTS)?;
        input.validate()?;
        Ok(self.store.create_client(input).await)
    }

    #[instrument(skip(self, input, actor), fields(actor = %actor.email, client_id = %client_id))]
    pub async fn update(
        &self,
        client_id: Uuid,
        input: &UpdateClient,
        actor: &User,
    ) -> Result<Client, LedgerError> {
        permissions::require(actor, capabilities::MANAGE_CLIENTS)?;
        input.validate()?;
        self.store.update_client(client_id, input).await
    }

    pub async fn get(&self, client_id: Uuid) -> Result<Client, LedgerError> {
        self.store
            .get_client(client_id)
            .await
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Client not found")))
    }

    pub async fn list(&self) -> Vec<Client> {
        self.store.list_clients().await
    }
}

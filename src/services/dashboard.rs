//! Dashboard aggregates.

use crate::error::LedgerError;
use crate::models::{DashboardStats, Role, User};
use crate::services::permissions::{self, capabilities};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<LedgerStore>,
}

impl DashboardService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Compute dashboard aggregates for the actor. Vendors are structurally
    /// barred from the aggregate view regardless of capability flags; other
    /// non-owners need the dashboard capability.
    pub async fn stats(&self, actor: &User) -> Result<DashboardStats, LedgerError> {
        if permissions::is_vendor_scoped(actor) {
            return Err(LedgerError::Unauthorized(anyhow!(
                "Vendors cannot access the dashboard"
            )));
        }
        if actor.role != Role::Owner {
            permissions::require(actor, capabilities::VIEW_DASHBOARD)?;
        }

        Ok(self.store.dashboard_stats(Utc::now().date_naive()).await)
    }
}

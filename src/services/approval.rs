//! Approval workflow.
//!
//! A per-invoice state machine orthogonal to payment status:
//! `Pending -> Approved` or `Pending -> Rejected`, both terminal. Rejected
//! invoices remain visible and payable; rejection blocks nothing
//! mechanically.

use crate::error::LedgerError;
use crate::models::{ApprovalStatus, Invoice, ListInvoicesFilter, Role, User};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Governs `approval_status` transitions. Approval authority is owner-only;
/// there is no separate capability flag for it.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    store: Arc<LedgerStore>,
}

impl ApprovalWorkflow {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    fn require_owner(actor: &User) -> Result<(), LedgerError> {
        if actor.role == Role::Owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(anyhow!(
                "Approval decisions require the owner role"
            )))
        }
    }

    /// Approve a pending invoice. Does not alter payment status.
    #[instrument(skip(self, actor), fields(actor = %actor.email, invoice_id = %invoice_id))]
    pub async fn approve(&self, invoice_id: Uuid, actor: &User) -> Result<Invoice, LedgerError> {
        Self::require_owner(actor)?;
        self.store
            .set_approval(invoice_id, ApprovalStatus::Approved, None)
            .await
    }

    /// Reject a pending invoice. A non-empty reason is required for the
    /// audit trail.
    #[instrument(skip(self, actor, reason), fields(actor = %actor.email, invoice_id = %invoice_id))]
    pub async fn reject(
        &self,
        invoice_id: Uuid,
        actor: &User,
        reason: &str,
    ) -> Result<Invoice, LedgerError> {
        Self::require_owner(actor)?;

        if reason.trim().is_empty() {
            return Err(LedgerError::Validation(anyhow!(
                "Rejection requires a reason"
            )));
        }

        self.store
            .set_approval(invoice_id, ApprovalStatus::Rejected, Some(reason))
            .await
    }

    /// The approval queue: all invoices still awaiting a decision.
    pub async fn pending(&self, actor: &User) -> Result<Vec<Invoice>, LedgerError> {
        Self::require_owner(actor)?;
        let filter = ListInvoicesFilter {
            approval_status: Some(ApprovalStatus::Pending),
            ..Default::default()
        };
        Ok(self.store.list_invoices(&filter).await)
    }
}

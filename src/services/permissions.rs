//! Capability checks.
//!
//! All authorization decisions live here; callers consume boolean results
//! and never re-derive role logic. Checks are pure and fail closed: an
//! unknown capability name is denied, never a panic.

use crate::error::LedgerError;
use crate::models::{Role, User};
use anyhow::anyhow;

/// Capability names gating individual actions.
pub mod capabilities {
    /// Create and update clients.
    pub const MANAGE_CLIENTS: &str = "can_manage_clients";

    /// Delete invoices.
    pub const DELETE_INVOICES: &str = "can_delete_invoices";

    /// Send payment reminders.
    pub const SEND_REMINDERS: &str = "can_send_reminders";

    /// View recorded payments.
    pub const VIEW_PAYMENTS: &str = "can_view_payments";

    /// Record payments against invoices.
    pub const RECORD_PAYMENTS: &str = "can_record_payments";

    /// Edit invoices after creation.
    pub const EDIT_INVOICES: &str = "can_edit_invoices";

    /// View the dashboard aggregates.
    pub const VIEW_DASHBOARD: &str = "can_view_dashboard";
}

/// Decide whether `actor` may perform the action gated by `capability`.
///
/// Owners pass every check. Any other role passes only with an explicit
/// grant in its permissions mapping; a missing mapping denies everything.
pub fn can_perform(actor: &User, capability: &str) -> bool {
    if actor.role == Role::Owner {
        return true;
    }

    let Some(permissions) = &actor.permissions else {
        return false;
    };

    match capability {
        capabilities::MANAGE_CLIENTS => permissions.can_manage_clients,
        capabilities::DELETE_INVOICES => permissions.can_delete_invoices,
        capabilities::SEND_REMINDERS => permissions.can_send_reminders,
        capabilities::VIEW_PAYMENTS => permissions.can_view_payments,
        capabilities::RECORD_PAYMENTS => permissions.can_record_payments,
        capabilities::EDIT_INVOICES => permissions.can_edit_invoices,
        capabilities::VIEW_DASHBOARD => permissions.can_view_dashboard,
        _ => false,
    }
}

/// `can_perform` as a guard, for use ahead of mutations.
pub fn require(actor: &User, capability: &str) -> Result<(), LedgerError> {
    if can_perform(actor, capability) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized(anyhow!(
            "{} requires the {} capability",
            actor.email,
            capability
        )))
    }
}

/// Structural restriction, independent of capability flags: vendors never
/// see the sales invoice surface nor the dashboard aggregate.
pub fn is_vendor_scoped(actor: &User) -> bool {
    actor.role == Role::Vendor
}

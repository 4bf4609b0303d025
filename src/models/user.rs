//! Actor model: users, roles, and per-user capability grants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user account. Exactly one per actor, immutable after
/// account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Accountant,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Accountant => "accountant",
            Role::Vendor => "vendor",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "owner" => Role::Owner,
            "vendor" => Role::Vendor,
            _ => Role::Accountant,
        }
    }
}

/// Explicit capability grants for a non-owner user. Absence of the whole
/// mapping means no elevated capabilities beyond role defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub can_manage_clients: bool,
    #[serde(default)]
    pub can_delete_invoices: bool,
    #[serde(default)]
    pub can_send_reminders: bool,
    #[serde(default)]
    pub can_view_payments: bool,
    #[serde(default)]
    pub can_record_payments: bool,
    #[serde(default)]
    pub can_edit_invoices: bool,
    #[serde(default)]
    pub can_view_dashboard: bool,
}

/// Authenticated actor. Supplied by the session source on every call; the
/// ledger never fabricates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_approved: bool,
    pub permissions: Option<Permissions>,
}

//! Dashboard aggregates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time aggregates over the whole ledger. Never cached; computed
/// fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_due: Decimal,
    pub pending_invoices: u64,
    pub overdue_invoices: u64,
    pub total_clients: u64,
}

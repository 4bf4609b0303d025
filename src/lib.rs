//! InvoiceFlow ledger - invoice lifecycle and authorization engine.
//!
//! A library-level domain engine meant to sit behind any transport: clients,
//! sales and purchase invoices, payments, an approval workflow, and a
//! role/capability permission model, over an in-memory store with
//! single-writer atomicity.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

use crate::config::LedgerConfig;
use crate::services::{
    ApprovalWorkflow, ClientDirectory, DashboardService, InvoiceLedger, LedgerStore,
    ReminderGateway, ReminderService, UserDirectory, WaLinkGateway,
};
use std::sync::Arc;

/// The assembled engine: one store, one handle per concern. Construct once
/// at process start and pass to callers; there is no hidden global instance.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<LedgerStore>,
    pub invoices: InvoiceLedger,
    pub approvals: ApprovalWorkflow,
    pub clients: ClientDirectory,
    pub users: UserDirectory,
    pub dashboard: DashboardService,
    pub reminders: ReminderService,
}

impl Ledger {
    /// Build a ledger with the default `wa.me` reminder gateway.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_gateway(config, Arc::new(WaLinkGateway))
    }

    /// Build a ledger with a custom reminder gateway.
    pub fn with_gateway(config: LedgerConfig, gateway: Arc<dyn ReminderGateway>) -> Self {
        let store = Arc::new(LedgerStore::new());
        let reminders = ReminderService::new(store.clone(), gateway, config.reminder_timeout());

        Self {
            invoices: InvoiceLedger::new(store.clone(), config),
            approvals: ApprovalWorkflow::new(store.clone()),
            clients: ClientDirectory::new(store.clone()),
            users: UserDirectory::new(store.clone()),
            dashboard: DashboardService::new(store.clone()),
            reminders,
            store,
        }
    }

    /// Direct access to the backing store, e.g. for seeding accounts.
    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }
}

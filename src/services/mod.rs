//! Ledger services.

pub mod approval;
pub mod clients;
pub mod dashboard;
pub mod ledger;
pub mod permissions;
pub mod reminders;
pub mod store;
pub mod users;

pub use approval::ApprovalWorkflow;
pub use clients::ClientDirectory;
pub use dashboard::DashboardService;
pub use ledger::InvoiceLedger;
pub use reminders::{
    ReminderChannel, ReminderGateway, ReminderOutcome, ReminderRequest, ReminderService,
    ReminderTarget, WaLinkGateway,
};
pub use store::LedgerStore;
pub use users::UserDirectory;

//! Domain models for the invoice ledger.

mod client;
mod dashboard;
mod invoice;
mod payment;
mod user;

pub use client::{Client, CreateClient, UpdateClient};
pub use dashboard::DashboardStats;
pub use invoice::{
    compute_totals, ApprovalStatus, CreateInvoice, CreateLineItem, Invoice, InvoiceStatus,
    InvoiceType, LineItem, ListInvoicesFilter, NewInvoice, UpdateInvoice,
};
pub use payment::{ListPaymentsFilter, Payment, RecordPayment};
pub use user::{Permissions, Role, User};

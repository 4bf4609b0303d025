//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use invoiceflow_ledger::config::LedgerConfig;
use invoiceflow_ledger::error::LedgerError;
use invoiceflow_ledger::models::{
    Client, CreateClient, CreateInvoice, CreateLineItem, InvoiceType, Permissions, RecordPayment,
    Role, User,
};
use invoiceflow_ledger::services::{
    ReminderChannel, ReminderGateway, ReminderOutcome, ReminderRequest,
};
use invoiceflow_ledger::Ledger;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::Once;
use tokio::sync::Mutex;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,invoiceflow_ledger=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_ledger() -> Ledger {
    init_tracing();
    Ledger::new(LedgerConfig::default())
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn full_permissions() -> Permissions {
    Permissions {
        can_manage_clients: true,
        can_delete_invoices: true,
        can_send_reminders: true,
        can_view_payments: true,
        can_record_payments: true,
        can_edit_invoices: true,
        can_view_dashboard: true,
    }
}

pub async fn seed_owner(ledger: &Ledger) -> User {
    ledger
        .store()
        .add_user(User {
            id: Uuid::new_v4(),
            email: "owner@invoiceflow.com".to_string(),
            name: "Jane Owner".to_string(),
            role: Role::Owner,
            is_approved: true,
            permissions: None,
        })
        .await
}

pub async fn seed_accountant(ledger: &Ledger, permissions: Option<Permissions>) -> User {
    ledger
        .store()
        .add_user(User {
            id: Uuid::new_v4(),
            email: "acc@invoiceflow.com".to_string(),
            name: "John Accountant".to_string(),
            role: Role::Accountant,
            is_approved: true,
            permissions,
        })
        .await
}

pub async fn seed_vendor(ledger: &Ledger, permissions: Option<Permissions>) -> User {
    ledger
        .store()
        .add_user(User {
            id: Uuid::new_v4(),
            email: "vendor@supplies.com".to_string(),
            name: "Vendor Supplies Co".to_string(),
            role: Role::Vendor,
            is_approved: true,
            permissions,
        })
        .await
}

pub async fn seed_client(ledger: &Ledger, actor: &User) -> Client {
    ledger
        .clients
        .create(
            &CreateClient {
                name: "Acme Corp".to_string(),
                email: "billing@acme.com".to_string(),
                phone: "+91 98765 43210".to_string(),
                address: None,
            },
            actor,
        )
        .await
        .expect("Failed to create client")
}

/// Sales invoice draft with a single line item (`quantity x unit_price`).
pub fn sales_draft(client_id: Uuid, quantity: i64, unit_price: i64) -> CreateInvoice {
    CreateInvoice {
        invoice_type: InvoiceType::Sales,
        client_id: Some(client_id),
        vendor_name: None,
        issue_date: None,
        due_date: None,
        items: vec![CreateLineItem {
            description: "Consulting Services".to_string(),
            quantity: dec(quantity),
            unit_price: dec(unit_price),
        }],
        subtotal: None,
        tax_rate: None,
        tax_amount: None,
        total_amount: None,
        notes: None,
    }
}

/// Itemless purchase invoice draft with a caller-supplied total.
pub fn purchase_draft(vendor_name: &str, total_amount: i64) -> CreateInvoice {
    CreateInvoice {
        invoice_type: InvoiceType::Purchase,
        client_id: None,
        vendor_name: Some(vendor_name.to_string()),
        issue_date: None,
        due_date: None,
        items: vec![],
        subtotal: None,
        tax_rate: None,
        tax_amount: None,
        total_amount: Some(dec(total_amount)),
        notes: None,
    }
}

pub fn payment(amount: i64) -> RecordPayment {
    RecordPayment {
        amount: dec(amount),
        payment_method: "bank_transfer".to_string(),
        payment_date: None,
        notes: None,
    }
}

/// Gateway that records every dispatched request instead of sending it.
pub struct CapturingGateway {
    pub requests: Mutex<Vec<ReminderRequest>>,
}

impl CapturingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ReminderGateway for CapturingGateway {
    async fn dispatch(&self, request: &ReminderRequest) -> Result<ReminderOutcome, LedgerError> {
        self.requests.lock().await.push(request.clone());
        Ok(ReminderOutcome {
            delivered: true,
            channel: ReminderChannel::DirectMessage,
            description: format!("Sent to {}", request.to_phone),
        })
    }
}

//! Invoice model and derived-status rules.

use crate::models::Role;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Invoice type. Immutable after creation; determines which counterparty
/// field is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Sales,
    Purchase,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sales => "sales",
            InvoiceType::Purchase => "purchase",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "purchase" => InvoiceType::Purchase,
            _ => InvoiceType::Sales,
        }
    }
}

/// Payment status. Derived from `paid_amount` and `total_amount`, never set
/// directly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Partial,
    Paid,
}

impl InvoiceStatus {
    /// Derivation rule: `Paid` iff the invoice is fully settled and carries a
    /// positive total, `Partial` iff some but not all of the total is paid,
    /// otherwise `Pending`.
    pub fn derive(paid_amount: Decimal, total_amount: Decimal) -> Self {
        if paid_amount == total_amount && total_amount > Decimal::ZERO {
            InvoiceStatus::Paid
        } else if paid_amount > Decimal::ZERO && paid_amount < total_amount {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
        }
    }
}

/// Approval status. An independent state machine, orthogonal to payment
/// status: `Pending -> Approved` or `Pending -> Rejected`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Owner uploads are trusted as approved from the start; everything else
    /// enters the approval queue.
    pub fn initial_for(role: Role) -> Self {
        match role {
            Role::Owner => ApprovalStatus::Approved,
            _ => ApprovalStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Line item on an invoice. `amount` is recomputed on write, never trusted
/// from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    pub fn from_input(input: &CreateLineItem) -> Self {
        Self {
            description: input.description.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            amount: input.quantity * input.unit_price,
        }
    }
}

/// Input for a line item on an invoice draft.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLineItem {
    #[validate(length(min = 1, message = "Line item description cannot be empty"))]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Compute `(subtotal, tax_amount, total_amount)` for a set of line items
/// under a flat tax rate.
pub fn compute_totals(items: &[LineItem], tax_rate: Decimal) -> (Decimal, Decimal, Decimal) {
    let subtotal: Decimal = items.iter().map(|item| item.amount).sum();
    let tax_amount = subtotal * tax_rate;
    (subtotal, tax_amount, subtotal + tax_amount)
}

/// Invoice record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    /// Populated for sales invoices only.
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    /// Populated for purchase invoices only.
    pub vendor_name: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub subtotal: Option<Decimal>,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: InvoiceStatus,
    pub approval_status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Outstanding balance.
    pub fn balance(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }
}

/// Invoice draft as supplied by the caller. Totals, when present, are
/// recomputed and cross-checked rather than trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub invoice_type: InvoiceType,
    pub client_id: Option<Uuid>,
    pub vendor_name: Option<String>,
    /// Defaults to today when absent.
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<CreateLineItem>,
    pub subtotal: Option<Decimal>,
    /// Defaults to the configured flat rate when absent.
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Validated invoice ready for insertion. Built by the ledger service after
/// draft validation; the store assigns the id and invoice number and resolves
/// the counterparty name.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_type: InvoiceType,
    pub client_id: Option<Uuid>,
    pub vendor_name: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub subtotal: Option<Decimal>,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub uploaded_by: Uuid,
    pub approval_status: ApprovalStatus,
}

/// Input for updating an invoice. Type and counterparty are immutable, and
/// edits never touch `approval_status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoice {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Replaces the line items wholesale and re-derives all totals.
    pub items: Option<Vec<CreateLineItem>>,
    pub tax_rate: Option<Decimal>,
    /// Only honoured for invoices without line items.
    pub total_amount: Option<Decimal>,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    pub invoice_type: Option<InvoiceType>,
    pub client_id: Option<Uuid>,
    pub status: Option<InvoiceStatus>,
    pub approval_status: Option<ApprovalStatus>,
}

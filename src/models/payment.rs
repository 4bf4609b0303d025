//! Payment model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A recorded payment against an invoice. Recording a payment is the only
/// way an invoice's `paid_amount` changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub invoice_number: String,
    /// Counterparty display name: the client for sales invoices, the vendor
    /// for purchase invoices.
    pub client_name: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPayment {
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Payment method cannot be empty"))]
    pub payment_method: String,
    /// Defaults to today when absent.
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Filter parameters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct ListPaymentsFilter {
    pub invoice_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

//! Invoice ledger operations: creation, payment recording, and queries.

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::models::{
    compute_totals, ApprovalStatus, CreateInvoice, CreateLineItem, Invoice, InvoiceType, LineItem,
    ListInvoicesFilter, ListPaymentsFilter, NewInvoice, Payment, RecordPayment, UpdateInvoice,
    User,
};
use crate::services::permissions::{self, capabilities};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Entry point for invoice and payment mutations. Authorization is checked
/// before any state is touched; all writes go through one atomic store
/// operation each.
#[derive(Clone)]
pub struct InvoiceLedger {
    store: Arc<LedgerStore>,
    config: LedgerConfig,
}

impl InvoiceLedger {
    pub fn new(store: Arc<LedgerStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    fn check_line_items(items: &[CreateLineItem]) -> Result<(), LedgerError> {
        for item in items {
            item.validate()?;
            if item.quantity <= Decimal::ZERO {
                return Err(LedgerError::Validation(anyhow!(
                    "Line item {} requires a positive quantity",
                    item.description
                )));
            }
            if item.unit_price < Decimal::ZERO {
                return Err(LedgerError::Validation(anyhow!(
                    "Line item {} cannot have a negative unit price",
                    item.description
                )));
            }
        }
        Ok(())
    }

    /// Create an invoice from a draft.
    ///
    /// The counterparty must match the invoice type, and caller-supplied
    /// totals are recomputed and rejected on mismatch rather than silently
    /// corrected. The stored invoice starts unpaid, with `approval_status`
    /// determined by the creator's role.
    #[instrument(skip(self, draft, actor), fields(actor = %actor.email, invoice_type = draft.invoice_type.as_str()))]
    pub async fn create_invoice(
        &self,
        draft: &CreateInvoice,
        actor: &User,
    ) -> Result<Invoice, LedgerError> {
        if permissions::is_vendor_scoped(actor) && draft.invoice_type == InvoiceType::Sales {
            return Err(LedgerError::Unauthorized(anyhow!(
                "Vendors cannot raise sales invoices"
            )));
        }

        Self::check_line_items(&draft.items)?;

        match draft.invoice_type {
            InvoiceType::Sales => {
                if draft.client_id.is_none() {
                    return Err(LedgerError::Validation(anyhow!(
                        "Sales invoice requires a client"
                    )));
                }
                if draft.vendor_name.is_some() {
                    return Err(LedgerError::Validation(anyhow!(
                        "Sales invoice cannot carry a vendor name"
                    )));
                }
            }
            InvoiceType::Purchase => {
                if draft.client_id.is_some() {
                    return Err(LedgerError::Validation(anyhow!(
                        "Purchase invoice cannot reference a client"
                    )));
                }
                if draft
                    .vendor_name
                    .as_deref()
                    .map_or(true, |name| name.trim().is_empty())
                {
                    return Err(LedgerError::Validation(anyhow!(
                        "Purchase invoice requires a vendor name"
                    )));
                }
            }
        }

        let tax_rate = draft.tax_rate.unwrap_or(self.config.default_tax_rate);
        let items: Vec<LineItem> = draft.items.iter().map(LineItem::from_input).collect();

        let (subtotal, tax_amount, total_amount) = if items.is_empty() {
            let total_amount = draft.total_amount.ok_or_else(|| {
                LedgerError::Validation(anyhow!("Invoice without line items requires a total"))
            })?;
            (None, draft.tax_amount.unwrap_or(Decimal::ZERO), total_amount)
        } else {
            let (subtotal, tax_amount, total_amount) = compute_totals(&items, tax_rate);
            if draft.subtotal.map_or(false, |s| s != subtotal) {
                return Err(LedgerError::Validation(anyhow!(
                    "Subtotal {} does not match line items, expected {}",
                    draft.subtotal.unwrap_or_default(),
                    subtotal
                )));
            }
            if draft.tax_amount.map_or(false, |t| t != tax_amount) {
                return Err(LedgerError::Validation(anyhow!(
                    "Tax amount {} does not match the applied rate, expected {}",
                    draft.tax_amount.unwrap_or_default(),
                    tax_amount
                )));
            }
            if draft.total_amount.map_or(false, |t| t != total_amount) {
                return Err(LedgerError::Validation(anyhow!(
                    "Total {} does not reconcile with subtotal and tax, expected {}",
                    draft.total_amount.unwrap_or_default(),
                    total_amount
                )));
            }
            (Some(subtotal), tax_amount, total_amount)
        };

        if total_amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(anyhow!(
                "Invoice total must be positive"
            )));
        }

        let new = NewInvoice {
            invoice_type: draft.invoice_type,
            client_id: draft.client_id,
            vendor_name: draft.vendor_name.clone(),
            issue_date: draft
                .issue_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            due_date: draft.due_date,
            items,
            subtotal,
            tax_rate,
            tax_amount,
            total_amount,
            notes: draft.notes.clone(),
            uploaded_by: actor.id,
            approval_status: ApprovalStatus::initial_for(actor.role),
        };

        let invoice = self.store.create_invoice(&new).await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            approval_status = invoice.approval_status.as_str(),
            "Invoice accepted"
        );

        Ok(invoice)
    }

    /// Record a payment against an invoice and return the updated invoice.
    #[instrument(skip(self, input, actor), fields(actor = %actor.email, invoice_id = %invoice_id))]
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        input: &RecordPayment,
        actor: &User,
    ) -> Result<Invoice, LedgerError> {
        permissions::require(actor, capabilities::RECORD_PAYMENTS)?;
        input.validate()?;

        let (_, invoice) = self.store.record_payment(invoice_id, input).await?;
        Ok(invoice)
    }

    /// Edit an invoice. Never touches `approval_status`.
    #[instrument(skip(self, changes, actor), fields(actor = %actor.email, invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        changes: &UpdateInvoice,
        actor: &User,
    ) -> Result<Invoice, LedgerError> {
        permissions::require(actor, capabilities::EDIT_INVOICES)?;

        if let Some(items) = &changes.items {
            Self::check_line_items(items)?;
        }

        self.store.update_invoice(invoice_id, changes).await
    }

    /// Delete an invoice together with its payments.
    #[instrument(skip(self, actor), fields(actor = %actor.email, invoice_id = %invoice_id))]
    pub async fn delete_invoice(
        &self,
        invoice_id: Uuid,
        actor: &User,
    ) -> Result<Invoice, LedgerError> {
        permissions::require(actor, capabilities::DELETE_INVOICES)?;
        self.store.delete_invoice(invoice_id).await
    }

    /// Fetch a single invoice. Vendors are scoped away from the sales
    /// surface entirely.
    pub async fn get_invoice(&self, invoice_id: Uuid, actor: &User) -> Result<Invoice, LedgerError> {
        let invoice = self
            .store
            .get_invoice(invoice_id)
            .await
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;

        if permissions::is_vendor_scoped(actor) && invoice.invoice_type == InvoiceType::Sales {
            return Err(LedgerError::Unauthorized(anyhow!(
                "Vendors cannot access sales invoices"
            )));
        }

        Ok(invoice)
    }

    /// List invoices. For vendors the listing is structurally scoped to
    /// purchase invoices; asking for the sales surface outright is refused.
    pub async fn list_invoices(
        &self,
        filter: &ListInvoicesFilter,
        actor: &User,
    ) -> Result<Vec<Invoice>, LedgerError> {
        let mut filter = filter.clone();
        if permissions::is_vendor_scoped(actor) {
            match filter.invoice_type {
                Some(InvoiceType::Sales) => {
                    return Err(LedgerError::Unauthorized(anyhow!(
                        "Vendors cannot access sales invoices"
                    )));
                }
                _ => filter.invoice_type = Some(InvoiceType::Purchase),
            }
        }

        Ok(self.store.list_invoices(&filter).await)
    }

    /// List recorded payments.
    pub async fn list_payments(
        &self,
        filter: &ListPaymentsFilter,
        actor: &User,
    ) -> Result<Vec<Payment>, LedgerError> {
        permissions::require(actor, capabilities::VIEW_PAYMENTS)?;
        Ok(self.store.list_payments(filter).await)
    }
}

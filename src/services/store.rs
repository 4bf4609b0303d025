//! In-memory ledger store.
//!
//! Fills the persistence-boundary role: create, read-by-id, list-with-filter,
//! and update-in-place, with single-writer atomicity. One lock guards the
//! whole ledger state; every mutating method takes the write guard once and
//! re-establishes all derived values (invoice `status`, client `total_due`)
//! before releasing it, so readers never observe a half-applied operation.

use crate::error::LedgerError;
use crate::models::{
    compute_totals, ApprovalStatus, Client, CreateClient, DashboardStats, Invoice, InvoiceStatus,
    InvoiceType, LineItem, ListInvoicesFilter, ListPaymentsFilter, NewInvoice, Payment,
    Permissions, RecordPayment, UpdateClient, UpdateInvoice, User,
};
use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    clients: HashMap<Uuid, Client>,
    invoices: HashMap<Uuid, Invoice>,
    payments: Vec<Payment>,
    sales_seq: u32,
    purchase_seq: u32,
}

impl State {
    fn next_invoice_number(&mut self, invoice_type: InvoiceType) -> String {
        match invoice_type {
            InvoiceType::Sales => {
                self.sales_seq += 1;
                format!("SI{:04}", self.sales_seq)
            }
            InvoiceType::Purchase => {
                self.purchase_seq += 1;
                format!("PI{:04}", self.purchase_seq)
            }
        }
    }

    /// Re-sum the client's outstanding balance over its non-paid sales
    /// invoices and replace `total_due` wholesale. Always a full
    /// recomputation, never an increment.
    fn refresh_client_due(&mut self, client_id: Uuid) {
        let total_due: Decimal = self
            .invoices
            .values()
            .filter(|invoice| {
                invoice.invoice_type == InvoiceType::Sales
                    && invoice.client_id == Some(client_id)
                    && invoice.status != InvoiceStatus::Paid
            })
            .map(Invoice::balance)
            .sum();

        if let Some(client) = self.clients.get_mut(&client_id) {
            client.total_due = total_due;
        }
    }
}

/// Authoritative collection of users, clients, invoices, and payments.
pub struct LedgerStore {
    state: RwLock<State>,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    // -------------------------------------------------------------------------
    // User operations
    // -------------------------------------------------------------------------

    /// Insert a user record. Account provisioning itself is upstream; this
    /// exists for seeding and for the session source's backing data.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn add_user(&self, user: User) -> User {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user.clone());
        user
    }

    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        self.state.read().await.users.get(&id).cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.state
            .read()
            .await
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    pub async fn list_users(&self) -> Vec<User> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn set_user_approved(&self, id: Uuid, approved: bool) -> Result<User, LedgerError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("User not found")))?;
        user.is_approved = approved;
        Ok(user.clone())
    }

    #[instrument(skip(self, permissions), fields(user_id = %id))]
    pub async fn set_user_permissions(
        &self,
        id: Uuid,
        permissions: Permissions,
    ) -> Result<User, LedgerError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("User not found")))?;
        user.permissions = Some(permissions);
        Ok(user.clone())
    }

    // -------------------------------------------------------------------------
    // Client operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input))]
    pub async fn create_client(&self, input: &CreateClient) -> Client {
        let client = Client {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            total_due: Decimal::ZERO,
        };

        let mut state = self.state.write().await;
        state.clients.insert(client.id, client.clone());

        info!(client_id = %client.id, name = %client.name, "Client created");

        client
    }

    #[instrument(skip(self, input), fields(client_id = %id))]
    pub async fn update_client(
        &self,
        id: Uuid,
        input: &UpdateClient,
    ) -> Result<Client, LedgerError> {
        let mut state = self.state.write().await;
        let client = state
            .clients
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Client not found")))?;

        if let Some(name) = &input.name {
            client.name = name.clone();
        }
        if let Some(email) = &input.email {
            client.email = email.clone();
        }
        if let Some(phone) = &input.phone {
            client.phone = phone.clone();
        }
        if let Some(address) = &input.address {
            client.address = Some(address.clone());
        }

        Ok(client.clone())
    }

    pub async fn get_client(&self, id: Uuid) -> Option<Client> {
        self.state.read().await.clients.get(&id).cloned()
    }

    pub async fn list_clients(&self) -> Vec<Client> {
        let state = self.state.read().await;
        let mut clients: Vec<Client> = state.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        clients
    }

    // -------------------------------------------------------------------------
    // Invoice operations
    // -------------------------------------------------------------------------

    /// Insert a validated invoice. Assigns the id and a sequential invoice
    /// number, resolves the client for sales invoices, and refreshes the
    /// client's `total_due` before the write guard is released.
    #[instrument(skip(self, new), fields(invoice_type = new.invoice_type.as_str()))]
    pub async fn create_invoice(&self, new: &NewInvoice) -> Result<Invoice, LedgerError> {
        let mut state = self.state.write().await;

        let (client_id, client_name) = match new.invoice_type {
            InvoiceType::Sales => {
                let id = new
                    .client_id
                    .ok_or_else(|| LedgerError::Validation(anyhow!("Sales invoice requires a client")))?;
                let client = state
                    .clients
                    .get(&id)
                    .ok_or_else(|| LedgerError::NotFound(anyhow!("Client not found")))?;
                (Some(id), Some(client.name.clone()))
            }
            InvoiceType::Purchase => (None, None),
        };

        let invoice = Invoice {
            id: Uuid::new_v4(),
            invoice_number: state.next_invoice_number(new.invoice_type),
            invoice_type: new.invoice_type,
            client_id,
            client_name,
            vendor_name: new.vendor_name.clone(),
            issue_date: new.issue_date,
            due_date: new.due_date,
            items: new.items.clone(),
            subtotal: new.subtotal,
            tax_rate: new.tax_rate,
            tax_amount: new.tax_amount,
            total_amount: new.total_amount,
            paid_amount: Decimal::ZERO,
            status: InvoiceStatus::derive(Decimal::ZERO, new.total_amount),
            approval_status: new.approval_status,
            rejection_reason: None,
            notes: new.notes.clone(),
            uploaded_by: new.uploaded_by,
            created_at: Utc::now(),
        };

        state.invoices.insert(invoice.id, invoice.clone());
        if let Some(client_id) = client_id {
            state.refresh_client_due(client_id);
        }

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total_amount = %invoice.total_amount,
            "Invoice created"
        );

        Ok(invoice)
    }

    pub async fn get_invoice(&self, id: Uuid) -> Option<Invoice> {
        self.state.read().await.invoices.get(&id).cloned()
    }

    pub async fn list_invoices(&self, filter: &ListInvoicesFilter) -> Vec<Invoice> {
        let state = self.state.read().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| {
                filter
                    .invoice_type
                    .map_or(true, |t| invoice.invoice_type == t)
                    && filter
                        .client_id
                        .map_or(true, |c| invoice.client_id == Some(c))
                    && filter.status.map_or(true, |s| invoice.status == s)
                    && filter
                        .approval_status
                        .map_or(true, |a| invoice.approval_status == a)
            })
            .cloned()
            .collect();
        invoices.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.invoice_number.cmp(&b.invoice_number))
        });
        invoices
    }

    /// Apply an edit to an invoice. Line-item changes re-derive all totals;
    /// the new total may never undercut what has already been paid. Edits do
    /// not touch `approval_status`.
    #[instrument(skip(self, changes), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: Uuid,
        changes: &UpdateInvoice,
    ) -> Result<Invoice, LedgerError> {
        if changes.items.is_some() && changes.total_amount.is_some() {
            return Err(LedgerError::Validation(anyhow!(
                "Total of an itemized invoice is derived from its line items"
            )));
        }

        let mut state = self.state.write().await;

        let client_id = {
            let invoice = state
                .invoices
                .get_mut(&id)
                .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;

            if changes.total_amount.is_some() && !invoice.items.is_empty() {
                return Err(LedgerError::Validation(anyhow!(
                    "Total of an itemized invoice is derived from its line items"
                )));
            }

            // A rejected edit must leave the invoice untouched, so the new
            // total is checked before the first field assignment.
            if let Some(total_amount) = changes.total_amount {
                Self::check_editable_total(total_amount, invoice.paid_amount)?;
            }

            if let Some(inputs) = &changes.items {
                let items: Vec<LineItem> = inputs.iter().map(LineItem::from_input).collect();
                let tax_rate = changes.tax_rate.unwrap_or(invoice.tax_rate);
                let (subtotal, tax_amount, total_amount) = compute_totals(&items, tax_rate);
                Self::check_editable_total(total_amount, invoice.paid_amount)?;
                invoice.items = items;
                invoice.subtotal = Some(subtotal);
                invoice.tax_rate = tax_rate;
                invoice.tax_amount = tax_amount;
                invoice.total_amount = total_amount;
            } else if let Some(tax_rate) = changes.tax_rate {
                if !invoice.items.is_empty() {
                    let (subtotal, tax_amount, total_amount) =
                        compute_totals(&invoice.items, tax_rate);
                    Self::check_editable_total(total_amount, invoice.paid_amount)?;
                    invoice.subtotal = Some(subtotal);
                    invoice.tax_amount = tax_amount;
                    invoice.total_amount = total_amount;
                }
                invoice.tax_rate = tax_rate;
            }

            if let Some(total_amount) = changes.total_amount {
                invoice.total_amount = total_amount;
            }

            if let Some(due_date) = changes.due_date {
                invoice.due_date = Some(due_date);
            }
            if let Some(notes) = &changes.notes {
                invoice.notes = Some(notes.clone());
            }

            invoice.status = InvoiceStatus::derive(invoice.paid_amount, invoice.total_amount);
            invoice.client_id
        };

        if let Some(client_id) = client_id {
            state.refresh_client_due(client_id);
        }

        let invoice = state.invoices.get(&id).cloned().ok_or_else(|| {
            LedgerError::NotFound(anyhow!("Invoice not found"))
        })?;

        info!(invoice_id = %id, total_amount = %invoice.total_amount, "Invoice updated");

        Ok(invoice)
    }

    fn check_editable_total(total_amount: Decimal, paid_amount: Decimal) -> Result<(), LedgerError> {
        if total_amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(anyhow!(
                "Invoice total must be positive"
            )));
        }
        if total_amount < paid_amount {
            return Err(LedgerError::Validation(anyhow!(
                "Invoice total {} cannot undercut amount already paid {}",
                total_amount,
                paid_amount
            )));
        }
        Ok(())
    }

    /// Remove an invoice and its payments, then refresh the client's
    /// `total_due`.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: Uuid) -> Result<Invoice, LedgerError> {
        let mut state = self.state.write().await;

        let invoice = state
            .invoices
            .remove(&id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;
        state.payments.retain(|payment| payment.invoice_id != id);

        if let Some(client_id) = invoice.client_id {
            state.refresh_client_due(client_id);
        }

        info!(invoice_id = %id, invoice_number = %invoice.invoice_number, "Invoice deleted");

        Ok(invoice)
    }

    /// Transition `approval_status` out of `Pending`. Both outcomes are
    /// terminal; re-submission means creating a new invoice.
    #[instrument(skip(self, reason), fields(invoice_id = %id, decision = decision.as_str()))]
    pub async fn set_approval(
        &self,
        id: Uuid,
        decision: ApprovalStatus,
        reason: Option<&str>,
    ) -> Result<Invoice, LedgerError> {
        let mut state = self.state.write().await;
        let invoice = state
            .invoices
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;

        if invoice.approval_status != ApprovalStatus::Pending {
            return Err(LedgerError::InvalidState(anyhow!(
                "Invoice is already {}",
                invoice.approval_status.as_str()
            )));
        }

        invoice.approval_status = decision;
        invoice.rejection_reason = reason.map(str::to_string);

        info!(
            invoice_id = %id,
            invoice_number = %invoice.invoice_number,
            decision = decision.as_str(),
            "Approval decision recorded"
        );

        Ok(invoice.clone())
    }

    // -------------------------------------------------------------------------
    // Payment operations
    // -------------------------------------------------------------------------

    /// Record a payment against an invoice. Overpayment is rejected outright
    /// against the state under the write guard, never clamped. Appends the
    /// payment, bumps `paid_amount`, re-derives `status`, and refreshes the
    /// client's `total_due` in one atomic step.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id, amount = %input.amount))]
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        input: &RecordPayment,
    ) -> Result<(Payment, Invoice), LedgerError> {
        let mut state = self.state.write().await;

        let invoice = state
            .invoices
            .get_mut(&invoice_id)
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;

        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(anyhow!(
                "Payment amount must be positive"
            )));
        }
        if invoice.paid_amount + input.amount > invoice.total_amount {
            return Err(LedgerError::InvalidAmount(anyhow!(
                "Payment amount {} exceeds outstanding balance {}",
                input.amount,
                invoice.balance()
            )));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            invoice_id,
            invoice_number: invoice.invoice_number.clone(),
            client_name: invoice
                .client_name
                .clone()
                .or_else(|| invoice.vendor_name.clone())
                .unwrap_or_default(),
            amount: input.amount,
            payment_date: input
                .payment_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            payment_method: input.payment_method.clone(),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };

        invoice.paid_amount += input.amount;
        invoice.status = InvoiceStatus::derive(invoice.paid_amount, invoice.total_amount);
        let client_id = invoice.client_id;
        let updated = invoice.clone();

        state.payments.push(payment.clone());
        if let Some(client_id) = client_id {
            state.refresh_client_due(client_id);
        }

        info!(
            payment_id = %payment.id,
            invoice_number = %payment.invoice_number,
            amount = %payment.amount,
            status = updated.status.as_str(),
            "Payment recorded"
        );

        Ok((payment, updated))
    }

    pub async fn list_payments(&self, filter: &ListPaymentsFilter) -> Vec<Payment> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|payment| {
                filter.invoice_id.map_or(true, |id| payment.invoice_id == id)
                    && filter.client_id.map_or(true, |id| {
                        state
                            .invoices
                            .get(&payment.invoice_id)
                            .map_or(false, |invoice| invoice.client_id == Some(id))
                    })
            })
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        payments
    }

    // -------------------------------------------------------------------------
    // Aggregates
    // -------------------------------------------------------------------------

    /// Compute dashboard aggregates fresh from the ledger.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> DashboardStats {
        let state = self.state.read().await;

        let mut total_sales = Decimal::ZERO;
        let mut total_purchases = Decimal::ZERO;
        let mut pending_invoices = 0;
        let mut overdue_invoices = 0;

        for invoice in state.invoices.values() {
            match invoice.invoice_type {
                InvoiceType::Sales => total_sales += invoice.total_amount,
                InvoiceType::Purchase => total_purchases += invoice.total_amount,
            }
            if invoice.status == InvoiceStatus::Pending {
                pending_invoices += 1;
            }
            if invoice.status != InvoiceStatus::Paid
                && invoice.due_date.map_or(false, |due| due < today)
            {
                overdue_invoices += 1;
            }
        }

        let total_due = state
            .clients
            .values()
            .map(|client| client.total_due)
            .sum();

        DashboardStats {
            total_sales,
            total_purchases,
            total_due,
            pending_invoices,
            overdue_invoices,
            total_clients: state.clients.len() as u64,
        }
    }
}

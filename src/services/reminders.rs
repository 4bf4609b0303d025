//! Reminder dispatch.
//!
//! The ledger only composes the reminder and hands it to a gateway; how the
//! message travels (direct API call or a pre-composed deep link the user
//! confirms) is entirely the gateway's concern. Dispatch runs under a
//! bounded wait so it can never block ledger mutations.

use crate::error::LedgerError;
use crate::models::{Invoice, InvoiceType, User};
use crate::services::permissions::{self, capabilities};
use crate::services::store::LedgerStore;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// What the reminder is about.
#[derive(Debug, Clone, Copy)]
pub enum ReminderTarget {
    Client(Uuid),
    Invoice(Uuid),
}

/// How the reminder left the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderChannel {
    DirectMessage,
    ComposedLink,
}

/// A composed reminder ready for dispatch.
#[derive(Debug, Clone)]
pub struct ReminderRequest {
    /// Digits-only phone number.
    pub to_phone: String,
    pub message: String,
}

/// Result of a dispatch attempt. `delivered` is true only when the message
/// actually left; a composed link still needs the user to confirm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderOutcome {
    pub delivered: bool,
    pub channel: ReminderChannel,
    pub description: String,
}

/// Transport boundary for reminders.
#[async_trait]
pub trait ReminderGateway: Send + Sync {
    async fn dispatch(&self, request: &ReminderRequest) -> Result<ReminderOutcome, LedgerError>;
}

/// Default gateway: composes a `wa.me` deep link for the user to confirm.
pub struct WaLinkGateway;

#[async_trait]
impl ReminderGateway for WaLinkGateway {
    async fn dispatch(&self, request: &ReminderRequest) -> Result<ReminderOutcome, LedgerError> {
        let link = format!(
            "https://wa.me/{}?text={}",
            request.to_phone,
            urlencoding::encode(&request.message)
        );

        Ok(ReminderOutcome {
            delivered: false,
            channel: ReminderChannel::ComposedLink,
            description: link,
        })
    }
}

/// Composes reminders from ledger state and dispatches them through the
/// configured gateway.
#[derive(Clone)]
pub struct ReminderService {
    store: Arc<LedgerStore>,
    gateway: Arc<dyn ReminderGateway>,
    timeout: Duration,
}

impl ReminderService {
    pub fn new(store: Arc<LedgerStore>, gateway: Arc<dyn ReminderGateway>, timeout: Duration) -> Self {
        Self {
            store,
            gateway,
            timeout,
        }
    }

    /// Send a reminder for an outstanding balance.
    ///
    /// Client-scoped reminders quote the client's `total_due`;
    /// invoice-scoped reminders quote the invoice number, its outstanding
    /// balance, and the due date.
    #[instrument(skip(self, actor), fields(actor = %actor.email))]
    pub async fn send_reminder(
        &self,
        target: ReminderTarget,
        actor: &User,
    ) -> Result<ReminderOutcome, LedgerError> {
        permissions::require(actor, capabilities::SEND_REMINDERS)?;

        let (client_id, invoice) = match target {
            ReminderTarget::Client(client_id) => (client_id, None),
            ReminderTarget::Invoice(invoice_id) => {
                let invoice = self
                    .store
                    .get_invoice(invoice_id)
                    .await
                    .ok_or_else(|| LedgerError::NotFound(anyhow!("Invoice not found")))?;
                if invoice.invoice_type != InvoiceType::Sales {
                    return Err(LedgerError::TargetNotReachable(anyhow!(
                        "Purchase invoices have no client to remind"
                    )));
                }
                let client_id = invoice.client_id.ok_or_else(|| {
                    LedgerError::TargetNotReachable(anyhow!("Invoice has no client on file"))
                })?;
                (client_id, Some(invoice))
            }
        };

        let client = self
            .store
            .get_client(client_id)
            .await
            .ok_or_else(|| LedgerError::NotFound(anyhow!("Client not found")))?;

        let phone: String = client
            .phone
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if phone.is_empty() {
            return Err(LedgerError::TargetNotReachable(anyhow!(
                "No contact phone on file for {}",
                client.name
            )));
        }

        let message = match &invoice {
            Some(invoice) => Self::invoice_message(&client.name, invoice),
            None => format!(
                "Hello {}, you have an outstanding balance of \u{20b9}{} with InvoiceFlow. \
                 Please check your dashboard for details.",
                client.name, client.total_due
            ),
        };

        let request = ReminderRequest {
            to_phone: phone,
            message,
        };

        let outcome = tokio::time::timeout(self.timeout, self.gateway.dispatch(&request))
            .await
            .map_err(|_| {
                LedgerError::Internal(anyhow!(
                    "Reminder dispatch timed out after {:?}",
                    self.timeout
                ))
            })??;

        info!(
            client_id = %client.id,
            delivered = outcome.delivered,
            channel = ?outcome.channel,
            "Reminder dispatched"
        );

        Ok(outcome)
    }

    fn invoice_message(client_name: &str, invoice: &Invoice) -> String {
        let mut message = format!(
            "Hello {}, this is a reminder for Invoice {} with an outstanding balance of \u{20b9}{}.",
            client_name,
            invoice.invoice_number,
            invoice.balance()
        );
        if let Some(due_date) = invoice.due_date {
            message.push_str(&format!(" Due date: {}.", due_date));
        }
        message.push_str(" Please process the payment at your earliest convenience.");
        message
    }
}

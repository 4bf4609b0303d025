//! Payment recording and balance derivation tests.

mod common;

use common::{dec, payment, sales_draft, seed_client, seed_owner, test_ledger};
use invoiceflow_ledger::error::LedgerError;
use invoiceflow_ledger::models::{InvoiceStatus, ListPaymentsFilter};
use uuid::Uuid;

#[tokio::test]
async fn partial_then_full_payment_settles_invoice_and_client() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &owner)
        .await
        .unwrap();
    assert_eq!(invoice.total_amount, dec(15_000));
    assert_eq!(
        ledger.clients.get(client.id).await.unwrap().total_due,
        dec(15_000)
    );

    let after_partial = ledger
        .invoices
        .record_payment(invoice.id, &payment(5_000), &owner)
        .await
        .expect("Failed to record partial payment");
    assert_eq!(after_partial.status, InvoiceStatus::Partial);
    assert_eq!(after_partial.paid_amount, dec(5_000));
    assert_eq!(after_partial.balance(), dec(10_000));
    assert_eq!(
        ledger.clients.get(client.id).await.unwrap().total_due,
        dec(10_000)
    );

    let after_full = ledger
        .invoices
        .record_payment(invoice.id, &payment(10_000), &owner)
        .await
        .expect("Failed to record final payment");
    assert_eq!(after_full.status, InvoiceStatus::Paid);
    assert_eq!(after_full.paid_amount, dec(15_000));
    assert_eq!(after_full.balance(), dec(0));
    assert_eq!(
        ledger.clients.get(client.id).await.unwrap().total_due,
        dec(0)
    );
}

#[tokio::test]
async fn overpayment_is_rejected_and_state_unchanged() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &owner)
        .await
        .unwrap();

    let err = ledger
        .invoices
        .record_payment(invoice.id, &payment(20_000), &owner)
        .await
        .expect_err("Overpayment must be rejected, not clamped");
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let unchanged = ledger.invoices.get_invoice(invoice.id, &owner).await.unwrap();
    assert_eq!(unchanged.paid_amount, dec(0));
    assert_eq!(unchanged.status, InvoiceStatus::Pending);
    assert_eq!(
        ledger.clients.get(client.id).await.unwrap().total_due,
        dec(15_000)
    );
}

#[tokio::test]
async fn overpayment_check_accounts_for_prior_payments() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &owner)
        .await
        .unwrap();
    ledger
        .invoices
        .record_payment(invoice.id, &payment(12_000), &owner)
        .await
        .unwrap();

    let err = ledger
        .invoices
        .record_payment(invoice.id, &payment(4_000), &owner)
        .await
        .expect_err("Cumulative overpayment must be rejected");
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let unchanged = ledger.invoices.get_invoice(invoice.id, &owner).await.unwrap();
    assert_eq!(unchanged.paid_amount, dec(12_000));
    assert_eq!(unchanged.status, InvoiceStatus::Partial);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &owner)
        .await
        .unwrap();

    for amount in [0, -500] {
        let err = ledger
            .invoices
            .record_payment(invoice.id, &payment(amount), &owner)
            .await
            .expect_err("Non-positive amount must be rejected");
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn payment_against_unknown_invoice_is_not_found() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;

    let err = ledger
        .invoices
        .record_payment(Uuid::new_v4(), &payment(100), &owner)
        .await;
    assert!(matches!(err, Err(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn payments_carry_invoice_number_and_counterparty() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &owner)
        .await
        .unwrap();
    ledger
        .invoices
        .record_payment(invoice.id, &payment(5_000), &owner)
        .await
        .unwrap();

    let payments = ledger
        .invoices
        .list_payments(
            &ListPaymentsFilter {
                invoice_id: Some(invoice.id),
                ..Default::default()
            },
            &owner,
        )
        .await
        .expect("Failed to list payments");

    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].invoice_number, "SI0001");
    assert_eq!(payments[0].client_name, "Acme Corp");
    assert_eq!(payments[0].amount, dec(5_000));
    assert_eq!(payments[0].payment_method, "bank_transfer");
}

#[tokio::test]
async fn rejected_invoices_remain_payable() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = common::seed_accountant(&ledger, Some(common::full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &accountant)
        .await
        .unwrap();
    ledger
        .approvals
        .reject(invoice.id, &owner, "Duplicate upload")
        .await
        .unwrap();

    // Rejection blocks nothing mechanically.
    let paid = ledger
        .invoices
        .record_payment(invoice.id, &payment(15_000), &owner)
        .await
        .expect("Rejected invoice must still accept payments");
    assert_eq!(paid.status, InvoiceStatus::Paid);
}

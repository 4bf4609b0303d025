//! Approval workflow tests.

mod common;

use common::{
    full_permissions, payment, sales_draft, seed_accountant, seed_client, seed_owner, test_ledger,
};
use invoiceflow_ledger::error::LedgerError;
use invoiceflow_ledger::models::{ApprovalStatus, InvoiceStatus};

#[tokio::test]
async fn owner_uploads_start_approved_others_pending() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = seed_accountant(&ledger, Some(full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let by_owner = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 1, 100), &owner)
        .await
        .unwrap();
    assert_eq!(by_owner.approval_status, ApprovalStatus::Approved);

    let by_accountant = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 1, 100), &accountant)
        .await
        .unwrap();
    assert_eq!(by_accountant.approval_status, ApprovalStatus::Pending);
}

#[tokio::test]
async fn approve_is_terminal_and_owner_only() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = seed_accountant(&ledger, Some(full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &accountant)
        .await
        .unwrap();

    // A fully-granted accountant still cannot approve.
    let err = ledger.approvals.approve(invoice.id, &accountant).await;
    assert!(matches!(err, Err(LedgerError::Unauthorized(_))));

    let approved = ledger
        .approvals
        .approve(invoice.id, &owner)
        .await
        .expect("Owner approval must succeed");
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);

    let err = ledger
        .approvals
        .approve(invoice.id, &owner)
        .await
        .expect_err("Second approval must fail");
    assert!(matches!(err, LedgerError::InvalidState(_)));
}

#[tokio::test]
async fn reject_requires_reason_and_is_terminal() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = seed_accountant(&ledger, Some(full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &accountant)
        .await
        .unwrap();

    let err = ledger.approvals.reject(invoice.id, &owner, "   ").await;
    assert!(matches!(err, Err(LedgerError::Validation(_))));

    let rejected = ledger
        .approvals
        .reject(invoice.id, &owner, "Missing purchase order reference")
        .await
        .expect("Rejection with a reason must succeed");
    assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Missing purchase order reference")
    );

    let err = ledger.approvals.approve(invoice.id, &owner).await;
    assert!(matches!(err, Err(LedgerError::InvalidState(_))));
}

#[tokio::test]
async fn approval_and_payment_state_are_orthogonal() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = seed_accountant(&ledger, Some(full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let invoice = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 10, 1500), &accountant)
        .await
        .unwrap();

    // Payment before approval is allowed and leaves the approval queue alone.
    let partial = ledger
        .invoices
        .record_payment(invoice.id, &payment(5_000), &owner)
        .await
        .unwrap();
    assert_eq!(partial.status, InvoiceStatus::Partial);
    assert_eq!(partial.approval_status, ApprovalStatus::Pending);

    // Approval leaves payment state alone.
    let approved = ledger.approvals.approve(invoice.id, &owner).await.unwrap();
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert_eq!(approved.status, InvoiceStatus::Partial);
    assert_eq!(approved.paid_amount, common::dec(5_000));
}

#[tokio::test]
async fn pending_queue_lists_only_undecided_invoices() {
    let ledger = test_ledger();
    let owner = seed_owner(&ledger).await;
    let accountant = seed_accountant(&ledger, Some(full_permissions())).await;
    let client = seed_client(&ledger, &owner).await;

    let first = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 1, 100), &accountant)
        .await
        .unwrap();
    let second = ledger
        .invoices
        .create_invoice(&sales_draft(client.id, 1, 200), &accountant)
        .await
        .unwrap();
    ledger.approvals.approve(first.id, &owner).await.unwrap();

    let queue = ledger.approvals.pending(&owner).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, second.id);

    let err = ledger.approvals.pending(&accountant).await;
    assert!(matches!(err, Err(LedgerError::Unauthorized(_))));
}

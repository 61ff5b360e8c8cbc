//! Service-level reconciliation tests against in-memory repositories.

use std::sync::Arc;

use serde_json::json;

use rizzpay_core::adapters::{
    InMemoryLedgerRepository, InMemoryMerchantRepository, InMemoryTransactionRepository,
    InMemoryUtrLogRepository,
};
use rizzpay_core::banks::{self, BankId, NormalizedStatus};
use rizzpay_core::domain::{MerchantProfile, TimelineStage, TransactionStatus};
use rizzpay_core::error::AppError;
use rizzpay_core::ports::{LedgerRepository, TransactionRepository, UtrLogRepository};
use rizzpay_core::services::{ReconciliationService, WalletService};

struct Harness {
    reconciliation: ReconciliationService,
    wallet: WalletService,
    transactions: Arc<InMemoryTransactionRepository>,
    utr_logs: Arc<InMemoryUtrLogRepository>,
    ledger: Arc<InMemoryLedgerRepository>,
}

fn harness(merchants: Vec<MerchantProfile>) -> Harness {
    let transactions = Arc::new(InMemoryTransactionRepository::new());
    let utr_logs = Arc::new(InMemoryUtrLogRepository::new());
    let ledger = Arc::new(InMemoryLedgerRepository::new());
    let merchant_repo = Arc::new(InMemoryMerchantRepository::with_profiles(merchants));

    Harness {
        reconciliation: ReconciliationService::new(transactions.clone(), utr_logs.clone()),
        wallet: WalletService::new(ledger.clone(), merchant_repo),
        transactions,
        utr_logs,
        ledger,
    }
}

fn merchant(id: &str) -> MerchantProfile {
    MerchantProfile {
        merchant_id: id.to_string(),
        name: format!("{} Stores", id),
        email: None,
    }
}

#[tokio::test]
async fn test_first_success_reports_created_and_no_previous_status() {
    let h = harness(vec![]);
    let payload = json!({"txnId": "TXN1", "status": "SUCCESS", "merchantId": "M7"});
    let event = banks::adapt_event(BankId::Hdfc, &payload).unwrap();

    let outcome = h.reconciliation.process(&event, &payload).await.unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.previous_status, None);
    assert_eq!(outcome.normalized, NormalizedStatus::Successful);
    assert_eq!(outcome.transaction.merchant_id, "M7");
    assert_eq!(outcome.transaction.status, TransactionStatus::Successful);
}

#[tokio::test]
async fn test_redelivery_reports_previous_success() {
    let h = harness(vec![]);
    let payload = json!({"txnId": "TXN1", "status": "SUCCESS"});
    let event = banks::adapt_event(BankId::Hdfc, &payload).unwrap();

    h.reconciliation.process(&event, &payload).await.unwrap();
    let second = h.reconciliation.process(&event, &payload).await.unwrap();

    assert!(!second.created);
    assert_eq!(
        second.previous_status,
        Some(TransactionStatus::Successful)
    );
    assert_eq!(second.transaction.processing_timeline.len(), 2);
    assert_eq!(second.transaction.status, TransactionStatus::Successful);
}

#[tokio::test]
async fn test_wallet_credit_gated_on_prior_status() {
    let h = harness(vec![merchant("M1")]);
    let payload = json!({"txnId": "TXN1", "status": "SUCCESS", "merchantId": "M1", "amount": "120.00"});
    let event = banks::adapt_event(BankId::Hdfc, &payload).unwrap();

    let first = h.reconciliation.process(&event, &payload).await.unwrap();
    let credited = h.wallet.credit_on_success(&first).await.unwrap();
    assert!(credited.is_some());

    let second = h.reconciliation.process(&event, &payload).await.unwrap();
    let recredited = h.wallet.credit_on_success(&second).await.unwrap();
    assert!(recredited.is_none());

    let entries = h.ledger.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, "120.00".parse().unwrap());

    let balance = h.ledger.balance("M1").await.unwrap();
    assert_eq!(balance, "120.00".parse().unwrap());
}

#[tokio::test]
async fn test_no_credit_for_non_success() {
    let h = harness(vec![merchant("M1")]);
    let payload = json!({"txnId": "TXN1", "status": "PENDING", "merchantId": "M1"});
    let event = banks::adapt_event(BankId::Hdfc, &payload).unwrap();

    let outcome = h.reconciliation.process(&event, &payload).await.unwrap();
    let credited = h.wallet.credit_on_success(&outcome).await.unwrap();

    assert!(credited.is_none());
    assert!(h.ledger.entries().await.is_empty());
}

#[tokio::test]
async fn test_pending_then_success_credits_once() {
    let h = harness(vec![merchant("M1")]);
    let pending = json!({"txnId": "TXN1", "status": "PENDING", "merchantId": "M1", "amount": "80.00"});
    let success = json!({"txnId": "TXN1", "status": "SUCCESS", "merchantId": "M1", "amount": "80.00"});

    let event = banks::adapt_event(BankId::Hdfc, &pending).unwrap();
    let outcome = h.reconciliation.process(&event, &pending).await.unwrap();
    h.wallet.credit_on_success(&outcome).await.unwrap();

    let event = banks::adapt_event(BankId::Hdfc, &success).unwrap();
    let outcome = h.reconciliation.process(&event, &success).await.unwrap();
    assert_eq!(outcome.previous_status, Some(TransactionStatus::Processing));
    h.wallet.credit_on_success(&outcome).await.unwrap();

    assert_eq!(h.ledger.entries().await.len(), 1);
    let tx = h.transactions.find_by_id("TXN1").await.unwrap().unwrap();
    assert_eq!(tx.processing_timeline.len(), 2);
    assert_eq!(tx.processing_timeline[0].stage, TimelineStage::Processing);
    assert_eq!(tx.processing_timeline[1].stage, TimelineStage::Completed);
}

#[tokio::test]
async fn test_missing_correlation_key_is_hard_failure() {
    let h = harness(vec![]);
    let payload = json!({"status": "SUCCESS"});
    let event = banks::adapt_event(BankId::Hdfc, &payload).unwrap();

    let result = h.reconciliation.process(&event, &payload).await;

    assert!(matches!(result, Err(AppError::MissingCorrelationKey)));
    assert_eq!(h.transactions.count().await, 0);
    assert_eq!(h.utr_logs.count().await, 0);
}

#[tokio::test]
async fn test_correlation_by_utr_attaches_to_existing_transaction() {
    let h = harness(vec![]);

    // First delivery keyed by transaction id, carrying a UTR.
    let first = json!({"txnId": "TXN5", "status": "PENDING", "utr": "UTRX"});
    let event = banks::adapt_event(BankId::Hdfc, &first).unwrap();
    h.reconciliation.process(&event, &first).await.unwrap();

    // Second delivery arrives UTR-only and must find the same record.
    let second = json!({"utr": "UTRX", "status": "SUCCESS"});
    let event = banks::adapt_event(BankId::Sbm, &second).unwrap();
    let outcome = h.reconciliation.process(&event, &second).await.unwrap();

    assert!(!outcome.created);
    assert_eq!(outcome.transaction.id, "TXN5");
    assert_eq!(h.transactions.count().await, 1);
    assert_eq!(outcome.transaction.processing_timeline.len(), 2);
}

#[tokio::test]
async fn test_payment_details_accumulate_across_deliveries() {
    let h = harness(vec![]);

    let first = json!({"txnId": "TXN6", "status": "PENDING", "bankRefNo": "REF-A"});
    let event = banks::adapt_event(BankId::Hdfc, &first).unwrap();
    h.reconciliation.process(&event, &first).await.unwrap();

    let second = json!({"txnId": "TXN6", "status": "SUCCESS", "fee": "3.00", "settlement_id": "S1"});
    let event = banks::adapt_event(BankId::Hdfc, &second).unwrap();
    let outcome = h.reconciliation.process(&event, &second).await.unwrap();

    let details = &outcome.transaction.payment_details;
    assert_eq!(details["bank_ref_no"], "REF-A");
    assert_eq!(details["fee"], "3.00");
    assert_eq!(details["settlement_id"], "S1");
}

#[tokio::test]
async fn test_utr_log_records_raw_payload() {
    let h = harness(vec![]);
    let payload = json!({"utr": "UTR42", "status": "SUCCESS", "amount": "10.00"});
    let event = banks::adapt_event(BankId::Sbm, &payload).unwrap();

    h.reconciliation.process(&event, &payload).await.unwrap();

    let log = h.utr_logs.find("UTR42").await.unwrap().unwrap();
    assert_eq!(log.raw_payload, payload);
    assert_eq!(log.bank_slug, "sbm-bank");
}

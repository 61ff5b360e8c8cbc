//! Wallet credit trigger. Posts one ledger credit and one activity-log row
//! the first time a transaction transitions into `successful`. Failure here
//! never fails the webhook; the caller logs and acknowledges anyway.

use std::sync::Arc;

use serde_json::json;

use crate::domain::{ActivityLogEntry, LedgerEntry, TransactionStatus};
use crate::error::AppError;
use crate::ports::{LedgerRepository, MerchantRepository};
use crate::services::reconciliation::ReconciliationOutcome;

const CREDIT_SOURCE: &str = "bank_webhook";

#[derive(Clone)]
pub struct WalletService {
    ledger: Arc<dyn LedgerRepository>,
    merchants: Arc<dyn MerchantRepository>,
}

impl WalletService {
    pub fn new(ledger: Arc<dyn LedgerRepository>, merchants: Arc<dyn MerchantRepository>) -> Self {
        Self { ledger, merchants }
    }

    /// Credit the merchant wallet if this delivery moved the transaction
    /// into `successful` for the first time. Redelivered success
    /// notifications are a no-op: the gate is the prior status, not the new
    /// one.
    pub async fn credit_on_success(
        &self,
        outcome: &ReconciliationOutcome,
    ) -> Result<Option<LedgerEntry>, AppError> {
        let tx = &outcome.transaction;

        if tx.status != TransactionStatus::Successful {
            return Ok(None);
        }
        if outcome.previous_status == Some(TransactionStatus::Successful) {
            tracing::debug!(
                transaction_id = %tx.id,
                "success redelivery, wallet already credited"
            );
            return Ok(None);
        }

        let profile = self
            .merchants
            .find(&tx.merchant_id)
            .await
            .map_err(|e| AppError::WalletCredit(e.to_string()))?;

        let Some(profile) = profile else {
            tracing::warn!(
                transaction_id = %tx.id,
                merchant_id = %tx.merchant_id,
                "no merchant profile, skipping wallet credit"
            );
            return Ok(None);
        };

        let entry = LedgerEntry::credit(
            profile.merchant_id.clone(),
            tx.amount.clone(),
            tx.currency.clone(),
            CREDIT_SOURCE.to_string(),
            Some(tx.id.clone()),
        );
        let saved = self
            .ledger
            .append(&entry)
            .await
            .map_err(|e| AppError::WalletCredit(e.to_string()))?;

        let activity = ActivityLogEntry::new(
            profile.merchant_id.clone(),
            "wallet_credit".to_string(),
            format!(
                "Wallet credited {} {} for transaction {}",
                tx.amount, tx.currency, tx.id
            ),
            json!({
                "transaction_id": tx.id,
                "amount": tx.amount.to_string(),
                "currency": tx.currency,
                "ledger_entry_id": saved.id,
            }),
        );
        self.ledger
            .log_activity(&activity)
            .await
            .map_err(|e| AppError::WalletCredit(e.to_string()))?;

        tracing::info!(
            transaction_id = %tx.id,
            merchant_id = %profile.merchant_id,
            amount = %tx.amount,
            currency = %tx.currency,
            "wallet credited"
        );

        Ok(Some(saved))
    }
}

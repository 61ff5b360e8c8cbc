//! Webhook reconciliation. Resolves a bank event to a transaction record,
//! applies the normalized status as one appended timeline entry, and keeps
//! the UTR log in step. Re-delivery of the same event is safe: every call
//! appends exactly one entry and the derived status never regresses behind
//! the latest delivery.

use std::sync::Arc;
use uuid::Uuid;

use crate::banks::{self, BankEvent, NormalizedStatus};
use crate::domain::transaction::{DEFAULT_CURRENCY, DEFAULT_MERCHANT_ID};
use crate::domain::{Transaction, TransactionStatus, UtrLog, UtrProcessingStatus};
use crate::error::AppError;
use crate::ports::{RepositoryError, TransactionRepository, UtrLogRepository};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct ReconciliationOutcome {
    pub transaction: Transaction,
    /// Status before this delivery; `None` when the record was created by it.
    pub previous_status: Option<TransactionStatus>,
    pub created: bool,
    pub normalized: NormalizedStatus,
}

#[derive(Clone)]
pub struct ReconciliationService {
    transactions: Arc<dyn TransactionRepository>,
    utr_logs: Arc<dyn UtrLogRepository>,
}

impl ReconciliationService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        utr_logs: Arc<dyn UtrLogRepository>,
    ) -> Self {
        Self {
            transactions,
            utr_logs,
        }
    }

    /// Process one bank event end to end. The correlation check runs before
    /// any store write so a rejected webhook leaves no trace.
    pub async fn process(
        &self,
        event: &BankEvent,
        raw_payload: &Value,
    ) -> Result<ReconciliationOutcome, AppError> {
        if event.correlation_key().is_none() {
            return Err(AppError::MissingCorrelationKey);
        }

        if let Some(utr) = &event.utr_number {
            let mut log = UtrLog::received(
                utr.clone(),
                event.bank.slug().to_string(),
                raw_payload.clone(),
            );
            log.processing_status = UtrProcessingStatus::Processing;
            self.utr_logs
                .upsert(&log)
                .await
                .map_err(|e| AppError::Persistence(e.to_string()))?;
        }

        let result = self.apply(event).await;

        if let Some(utr) = &event.utr_number {
            let (status, transaction_id) = match &result {
                Ok(outcome) => (
                    UtrProcessingStatus::Completed,
                    Some(outcome.transaction.id.clone()),
                ),
                Err(_) => (UtrProcessingStatus::Failed, None),
            };
            if let Err(e) = self
                .utr_logs
                .set_status(utr, status, transaction_id.as_deref())
                .await
            {
                tracing::error!(utr = %utr, error = %e, "failed to finalize UTR log");
            }
        }

        result
    }

    async fn apply(&self, event: &BankEvent) -> Result<ReconciliationOutcome, AppError> {
        let (mut tx, created, previous_status) = self.resolve(event).await?;

        let normalized = banks::normalize(event.bank, &event.raw_status);
        let stage = normalized.stage();

        tx.merge_payment_details(&event.provider_fields);
        if let Some(utr) = &event.utr_number {
            tx.merge_payment_details(&json!({ "utr_number": utr }));
            if tx.utr_number.is_none() {
                tx.utr_number = Some(utr.clone());
            }
        }
        if let Some(amount) = &event.amount {
            tx.merge_payment_details(&json!({ "bank_amount": amount.to_string() }));
        }
        if tx.payment_method.is_none() {
            tx.payment_method = event.payment_method.clone();
        }

        tx.apply_stage(
            stage,
            format!("{} reported {}", event.bank, event.raw_status),
            Some(json!({
                "bank": event.bank.slug(),
                "raw_status": event.raw_status,
            })),
        );

        let saved = if created {
            self.transactions
                .insert(&tx)
                .await
                .map_err(|e| AppError::Persistence(e.to_string()))?
        } else {
            match self.transactions.update(&tx).await {
                Ok(saved) => saved,
                // Resolved a moment ago, gone now. Should not happen.
                Err(RepositoryError::NotFound(_)) => {
                    return Err(AppError::Consistency(format!(
                        "transaction {} disappeared during update",
                        tx.id
                    )));
                }
                Err(e) => return Err(AppError::Persistence(e.to_string())),
            }
        };

        tracing::info!(
            transaction_id = %saved.id,
            bank = %event.bank,
            raw_status = %event.raw_status,
            status = %saved.status,
            created,
            "webhook reconciled"
        );

        Ok(ReconciliationOutcome {
            transaction: saved,
            previous_status,
            created,
            normalized,
        })
    }

    /// Lookup order: primary id, then UTR. A miss on both synthesizes a new
    /// record stamped with whatever the payload supplied.
    async fn resolve(
        &self,
        event: &BankEvent,
    ) -> Result<(Transaction, bool, Option<TransactionStatus>), AppError> {
        if let Some(id) = &event.transaction_id {
            if let Some(tx) = self
                .transactions
                .find_by_id(id)
                .await
                .map_err(|e| AppError::Persistence(e.to_string()))?
            {
                let previous = tx.status;
                return Ok((tx, false, Some(previous)));
            }
        }

        if let Some(utr) = &event.utr_number {
            if let Some(tx) = self
                .transactions
                .find_by_utr(utr)
                .await
                .map_err(|e| AppError::Persistence(e.to_string()))?
            {
                let previous = tx.status;
                return Ok((tx, false, Some(previous)));
            }
        }

        if let Some(order_id) = &event.order_id {
            if let Some(tx) = self
                .transactions
                .find_by_id(order_id)
                .await
                .map_err(|e| AppError::Persistence(e.to_string()))?
            {
                let previous = tx.status;
                return Ok((tx, false, Some(previous)));
            }
        }

        let id = event
            .transaction_id
            .clone()
            .or_else(|| event.order_id.clone())
            .unwrap_or_else(|| format!("TXN-{}", Uuid::new_v4().simple()));

        let mut tx = Transaction::new(
            id,
            event
                .merchant_id
                .clone()
                .unwrap_or_else(|| DEFAULT_MERCHANT_ID.to_string()),
            event.amount.clone().unwrap_or_else(|| BigDecimal::from(0)),
            event
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        );
        tx.utr_number = event.utr_number.clone();

        Ok((tx, true, None))
    }
}

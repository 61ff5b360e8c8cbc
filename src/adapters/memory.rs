//! In-memory repository adapters. Deterministic substitutes for the
//! Postgres adapters so reconciliation logic is testable without a live
//! database. Not used by the serving path.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{
    ActivityLogEntry, LedgerEntry, MerchantProfile, Transaction, UtrLog, UtrProcessingStatus,
};
use crate::ports::{
    LedgerRepository, MerchantRepository, RepositoryError, RepositoryResult,
    TransactionRepository, UtrLogRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryTransactionRepository {
    rows: Arc<Mutex<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Transaction>> {
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn find_by_utr(&self, utr_number: &str) -> RepositoryResult<Option<Transaction>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .find(|tx| tx.utr_number.as_deref() == Some(utr_number))
            .cloned())
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&tx.id) {
            return Err(RepositoryError::Storage(format!(
                "duplicate transaction id {}",
                tx.id
            )));
        }
        rows.insert(tx.id.clone(), tx.clone());
        Ok(tx.clone())
    }

    async fn update(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut rows = self.rows.lock().await;
        if !rows.contains_key(&tx.id) {
            return Err(RepositoryError::NotFound(tx.id.clone()));
        }
        rows.insert(tx.id.clone(), tx.clone());
        Ok(tx.clone())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUtrLogRepository {
    rows: Arc<Mutex<HashMap<String, UtrLog>>>,
}

impl InMemoryUtrLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl UtrLogRepository for InMemoryUtrLogRepository {
    async fn upsert(&self, log: &UtrLog) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&log.utr_number) {
            Some(existing) => {
                existing.raw_payload = log.raw_payload.clone();
                existing.processing_status = log.processing_status;
                existing.updated_at = log.updated_at;
            }
            None => {
                rows.insert(log.utr_number.clone(), log.clone());
            }
        }
        Ok(())
    }

    async fn set_status(
        &self,
        utr_number: &str,
        status: UtrProcessingStatus,
        transaction_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().await;
        if let Some(log) = rows.get_mut(utr_number) {
            log.processing_status = status;
            if let Some(id) = transaction_id {
                log.transaction_id = Some(id.to_string());
            }
            log.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn find(&self, utr_number: &str) -> RepositoryResult<Option<UtrLog>> {
        Ok(self.rows.lock().await.get(utr_number).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLedgerRepository {
    entries: Arc<Mutex<Vec<LedgerEntry>>>,
    activities: Arc<Mutex<Vec<ActivityLogEntry>>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn activities(&self) -> Vec<ActivityLogEntry> {
        self.activities.lock().await.clone()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn append(&self, entry: &LedgerEntry) -> RepositoryResult<LedgerEntry> {
        self.entries.lock().await.push(entry.clone());
        Ok(entry.clone())
    }

    async fn log_activity(&self, entry: &ActivityLogEntry) -> RepositoryResult<()> {
        self.activities.lock().await.push(entry.clone());
        Ok(())
    }

    async fn balance(&self, merchant_id: &str) -> RepositoryResult<BigDecimal> {
        let entries = self.entries.lock().await;
        let balance = entries
            .iter()
            .filter(|e| e.merchant_id == merchant_id)
            .fold(BigDecimal::from(0), |acc, e| match e.direction {
                crate::domain::LedgerDirection::Credit => acc + e.amount.clone(),
                crate::domain::LedgerDirection::Debit => acc - e.amount.clone(),
            });
        Ok(balance)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMerchantRepository {
    profiles: Arc<Mutex<HashMap<String, MerchantProfile>>>,
}

impl InMemoryMerchantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<MerchantProfile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.merchant_id.clone(), p))
            .collect();
        Self {
            profiles: Arc::new(Mutex::new(map)),
        }
    }
}

#[async_trait]
impl MerchantRepository for InMemoryMerchantRepository {
    async fn find(&self, merchant_id: &str) -> RepositoryResult<Option<MerchantProfile>> {
        Ok(self.profiles.lock().await.get(merchant_id).cloned())
    }
}

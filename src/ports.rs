//! Repository ports. Handlers and services depend on these traits only;
//! Postgres adapters live in `adapters`, in-memory ones back the tests.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::{ActivityLogEntry, LedgerEntry, MerchantProfile, Transaction, UtrLog, UtrProcessingStatus};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(err.to_string()),
            other => RepositoryError::Storage(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Transaction>>;
    async fn find_by_utr(&self, utr_number: &str) -> RepositoryResult<Option<Transaction>>;
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;
    /// Persist the full current state of an existing transaction.
    /// `NotFound` here means the row vanished after resolution.
    async fn update(&self, tx: &Transaction) -> RepositoryResult<Transaction>;
}

#[async_trait]
pub trait UtrLogRepository: Send + Sync {
    /// Insert the log row, or refresh payload and status if the UTR was
    /// seen before. Keeps at most one row per UTR.
    async fn upsert(&self, log: &UtrLog) -> RepositoryResult<()>;
    async fn set_status(
        &self,
        utr_number: &str,
        status: UtrProcessingStatus,
        transaction_id: Option<&str>,
    ) -> RepositoryResult<()>;
    async fn find(&self, utr_number: &str) -> RepositoryResult<Option<UtrLog>>;
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn append(&self, entry: &LedgerEntry) -> RepositoryResult<LedgerEntry>;
    async fn log_activity(&self, entry: &ActivityLogEntry) -> RepositoryResult<()>;
    /// Derived balance: SUM(credits) - SUM(debits). Never stored.
    async fn balance(&self, merchant_id: &str) -> RepositoryResult<BigDecimal>;
}

#[async_trait]
pub trait MerchantRepository: Send + Sync {
    async fn find(&self, merchant_id: &str) -> RepositoryResult<Option<MerchantProfile>>;
}

//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{TimelineEntry, Transaction};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

const TRANSACTION_COLUMNS: &str = "id, merchant_id, amount, currency, status, transaction_type, \
     payment_method, utr_number, payment_details, processing_timeline, \
     settlement_date, created_at, updated_at";

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn find_by_utr(&self, utr_number: &str) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE utr_number = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(utr_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let timeline = serde_json::to_value(&tx.processing_timeline)
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions ({TRANSACTION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {TRANSACTION_COLUMNS}
            "#,
        ))
        .bind(&tx.id)
        .bind(&tx.merchant_id)
        .bind(&tx.amount)
        .bind(&tx.currency)
        .bind(tx.status.as_str())
        .bind(&tx.transaction_type)
        .bind(&tx.payment_method)
        .bind(&tx.utr_number)
        .bind(&tx.payment_details)
        .bind(&timeline)
        .bind(tx.settlement_date)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn update(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let timeline = serde_json::to_value(&tx.processing_timeline)
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            UPDATE transactions
            SET status = $2,
                payment_method = $3,
                utr_number = $4,
                payment_details = $5,
                processing_timeline = $6,
                settlement_date = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#,
        ))
        .bind(&tx.id)
        .bind(tx.status.as_str())
        .bind(&tx.payment_method)
        .bind(&tx.utr_number)
        .bind(&tx.payment_details)
        .bind(&timeline)
        .bind(tx.settlement_date)
        .bind(tx.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(tx.id.clone()))?
            .into_domain()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    merchant_id: String,
    amount: bigdecimal::BigDecimal,
    currency: String,
    status: String,
    transaction_type: String,
    payment_method: Option<String>,
    utr_number: Option<String>,
    payment_details: serde_json::Value,
    processing_timeline: serde_json::Value,
    settlement_date: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Storage(e))?;
        let processing_timeline: Vec<TimelineEntry> =
            serde_json::from_value(self.processing_timeline)
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(Transaction {
            id: self.id,
            merchant_id: self.merchant_id,
            amount: self.amount,
            currency: self.currency,
            status,
            transaction_type: self.transaction_type,
            payment_method: self.payment_method,
            utr_number: self.utr_number,
            payment_details: self.payment_details,
            processing_timeline,
            settlement_date: self.settlement_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

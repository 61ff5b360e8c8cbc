//! Postgres implementation of UtrLogRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{UtrLog, UtrProcessingStatus};
use crate::ports::{RepositoryError, RepositoryResult, UtrLogRepository};

#[derive(Clone)]
pub struct PostgresUtrLogRepository {
    pool: PgPool,
}

impl PostgresUtrLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UtrLogRepository for PostgresUtrLogRepository {
    async fn upsert(&self, log: &UtrLog) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO utr_logs (
                utr_number, bank_slug, raw_payload, processing_status,
                transaction_id, received_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (utr_number) DO UPDATE
            SET raw_payload = EXCLUDED.raw_payload,
                processing_status = EXCLUDED.processing_status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&log.utr_number)
        .bind(&log.bank_slug)
        .bind(&log.raw_payload)
        .bind(log.processing_status.as_str())
        .bind(&log.transaction_id)
        .bind(log.received_at)
        .bind(log.updated_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn set_status(
        &self,
        utr_number: &str,
        status: UtrProcessingStatus,
        transaction_id: Option<&str>,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE utr_logs
            SET processing_status = $2,
                transaction_id = COALESCE($3, transaction_id),
                updated_at = NOW()
            WHERE utr_number = $1
            "#,
        )
        .bind(utr_number)
        .bind(status.as_str())
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find(&self, utr_number: &str) -> RepositoryResult<Option<UtrLog>> {
        let row = sqlx::query_as::<_, UtrLogRow>("SELECT * FROM utr_logs WHERE utr_number = $1")
            .bind(utr_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        row.map(UtrLogRow::into_domain).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UtrLogRow {
    utr_number: String,
    bank_slug: String,
    raw_payload: serde_json::Value,
    processing_status: String,
    transaction_id: Option<String>,
    received_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl UtrLogRow {
    fn into_domain(self) -> RepositoryResult<UtrLog> {
        let processing_status = self
            .processing_status
            .parse()
            .map_err(|e: String| RepositoryError::Storage(e))?;

        Ok(UtrLog {
            utr_number: self.utr_number,
            bank_slug: self.bank_slug,
            raw_payload: self.raw_payload,
            processing_status,
            transaction_id: self.transaction_id,
            received_at: self.received_at,
            updated_at: self.updated_at,
        })
    }
}

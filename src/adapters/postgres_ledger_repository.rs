//! Postgres implementations of LedgerRepository and MerchantRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;

use crate::domain::{ActivityLogEntry, LedgerEntry, MerchantProfile};
use crate::ports::{LedgerRepository, MerchantRepository, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn append(&self, entry: &LedgerEntry) -> RepositoryResult<LedgerEntry> {
        let row = sqlx::query_as::<_, LedgerEntryRow>(
            r#"
            INSERT INTO wallet_ledger_entries (
                id, merchant_id, amount, currency, direction, source,
                reference_transaction_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(&entry.merchant_id)
        .bind(&entry.amount)
        .bind(&entry.currency)
        .bind(entry.direction.as_str())
        .bind(&entry.source)
        .bind(&entry.reference_transaction_id)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn log_activity(&self, entry: &ActivityLogEntry) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, merchant_id, activity_type, description, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.merchant_id)
        .bind(&entry.activity_type)
        .bind(&entry.description)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn balance(&self, merchant_id: &str) -> RepositoryResult<BigDecimal> {
        let balance: Option<BigDecimal> = sqlx::query_scalar(
            r#"
            SELECT SUM(CASE WHEN direction = 'credit' THEN amount ELSE -amount END)
            FROM wallet_ledger_entries
            WHERE merchant_id = $1
            "#,
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(balance.unwrap_or_else(|| BigDecimal::from(0)))
    }
}

#[derive(Clone)]
pub struct PostgresMerchantRepository {
    pool: PgPool,
}

impl PostgresMerchantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MerchantRepository for PostgresMerchantRepository {
    async fn find(&self, merchant_id: &str) -> RepositoryResult<Option<MerchantProfile>> {
        let profile = sqlx::query_as::<_, MerchantProfileRow>(
            "SELECT merchant_id, name, email FROM merchant_profiles WHERE merchant_id = $1",
        )
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(profile.map(MerchantProfileRow::into_domain))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerEntryRow {
    id: uuid::Uuid,
    merchant_id: String,
    amount: BigDecimal,
    currency: String,
    direction: String,
    source: String,
    reference_transaction_id: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl LedgerEntryRow {
    fn into_domain(self) -> RepositoryResult<LedgerEntry> {
        let direction = self
            .direction
            .parse()
            .map_err(|e: String| RepositoryError::Storage(e))?;

        Ok(LedgerEntry {
            id: self.id,
            merchant_id: self.merchant_id,
            amount: self.amount,
            currency: self.currency,
            direction,
            source: self.source,
            reference_transaction_id: self.reference_transaction_id,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MerchantProfileRow {
    merchant_id: String,
    name: String,
    email: Option<String>,
}

impl MerchantProfileRow {
    fn into_domain(self) -> MerchantProfile {
        MerchantProfile {
            merchant_id: self.merchant_id,
            name: self.name,
            email: self.email,
        }
    }
}

//! Wallet ledger, merchant profile and activity log entities.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Direction of a ledger movement. Entries are append-only; a correction is
/// a new entry in the opposite direction, never an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerDirection {
    Credit,
    Debit,
}

impl LedgerDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerDirection::Credit => "credit",
            LedgerDirection::Debit => "debit",
        }
    }
}

impl fmt::Display for LedgerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(LedgerDirection::Credit),
            "debit" => Ok(LedgerDirection::Debit),
            other => Err(format!("unknown ledger direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub merchant_id: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub direction: LedgerDirection,
    pub source: String,
    pub reference_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn credit(
        merchant_id: String,
        amount: BigDecimal,
        currency: String,
        source: String,
        reference_transaction_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            merchant_id,
            amount,
            currency,
            direction: LedgerDirection::Credit,
            source,
            reference_transaction_id,
            created_at: Utc::now(),
        }
    }
}

/// Merchant contact profile consulted before crediting a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantProfile {
    pub merchant_id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub merchant_id: String,
    pub activity_type: String,
    pub description: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    pub fn new(
        merchant_id: String,
        activity_type: String,
        description: String,
        metadata: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            merchant_id,
            activity_type,
            description,
            metadata,
            created_at: Utc::now(),
        }
    }
}

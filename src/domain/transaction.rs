//! Transaction domain entity.
//! Framework-agnostic representation of a gateway transaction and its
//! append-only processing timeline.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_TRANSACTION_TYPE: &str = "UPI";
pub const DEFAULT_MERCHANT_ID: &str = "unknown";

/// Lifecycle status of a transaction. Always derived from the stage of the
/// most recent timeline entry, never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Successful,
    Failed,
    Settled,
    Declined,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Successful => "successful",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Settled => "settled",
            TransactionStatus::Declined => "declined",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "processing" => Ok(TransactionStatus::Processing),
            "successful" => Ok(TransactionStatus::Successful),
            "failed" => Ok(TransactionStatus::Failed),
            "settled" => Ok(TransactionStatus::Settled),
            "declined" => Ok(TransactionStatus::Declined),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// Stage recorded on a timeline entry. The stage→status table below is
/// fixed; adding a stage requires a matching status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStage {
    Received,
    Processing,
    Completed,
    Failed,
    Settled,
    Declined,
    Cancelled,
}

impl TimelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineStage::Received => "received",
            TimelineStage::Processing => "processing",
            TimelineStage::Completed => "completed",
            TimelineStage::Failed => "failed",
            TimelineStage::Settled => "settled",
            TimelineStage::Declined => "declined",
            TimelineStage::Cancelled => "cancelled",
        }
    }

    /// Fixed stage→status table.
    pub fn status(&self) -> TransactionStatus {
        match self {
            TimelineStage::Received => TransactionStatus::Pending,
            TimelineStage::Processing => TransactionStatus::Processing,
            TimelineStage::Completed => TransactionStatus::Successful,
            TimelineStage::Failed => TransactionStatus::Failed,
            TimelineStage::Settled => TransactionStatus::Settled,
            TimelineStage::Declined => TransactionStatus::Declined,
            TimelineStage::Cancelled => TransactionStatus::Cancelled,
        }
    }
}

impl fmt::Display for TimelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in a transaction's processing timeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntry {
    pub stage: TimelineStage,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: String,
    pub merchant_id: String,
    #[schema(value_type = String)]
    pub amount: BigDecimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub transaction_type: String,
    pub payment_method: Option<String>,
    pub utr_number: Option<String>,
    #[schema(value_type = Object)]
    pub payment_details: Value,
    pub processing_timeline: Vec<TimelineEntry>,
    pub settlement_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// New transaction with an empty timeline. The caller is expected to
    /// apply a stage before persisting; until then the status is `pending`.
    pub fn new(id: String, merchant_id: String, amount: BigDecimal, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            merchant_id,
            amount,
            currency,
            status: TransactionStatus::Pending,
            transaction_type: DEFAULT_TRANSACTION_TYPE.to_string(),
            payment_method: None,
            utr_number: None,
            payment_details: Value::Object(serde_json::Map::new()),
            processing_timeline: Vec::new(),
            settlement_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one timeline entry and re-derive the status from its stage.
    /// Entries are never removed or reordered. On the first transition into
    /// `completed` the settlement date is stamped.
    pub fn apply_stage(&mut self, stage: TimelineStage, message: String, details: Option<Value>) {
        let now = Utc::now();
        self.processing_timeline.push(TimelineEntry {
            stage,
            timestamp: now,
            message,
            details,
        });
        self.status = stage.status();
        if stage == TimelineStage::Completed && self.settlement_date.is_none() {
            self.settlement_date = Some(now);
        }
        self.updated_at = now;
    }

    /// Merge provider-specific fields into `payment_details`. New keys win;
    /// untouched prior keys survive.
    pub fn merge_payment_details(&mut self, incoming: &Value) {
        if let Value::Object(incoming_map) = incoming {
            if !self.payment_details.is_object() {
                self.payment_details = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(existing) = &mut self.payment_details {
                for (key, value) in incoming_map {
                    existing.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_status_table() {
        assert_eq!(TimelineStage::Received.status(), TransactionStatus::Pending);
        assert_eq!(
            TimelineStage::Processing.status(),
            TransactionStatus::Processing
        );
        assert_eq!(
            TimelineStage::Completed.status(),
            TransactionStatus::Successful
        );
        assert_eq!(TimelineStage::Failed.status(), TransactionStatus::Failed);
        assert_eq!(TimelineStage::Settled.status(), TransactionStatus::Settled);
    }

    #[test]
    fn test_apply_stage_appends_and_derives_status() {
        let mut tx = Transaction::new(
            "TXN-1".to_string(),
            "merchant-1".to_string(),
            BigDecimal::from(100),
            DEFAULT_CURRENCY.to_string(),
        );
        tx.apply_stage(TimelineStage::Processing, "bank notified".to_string(), None);
        tx.apply_stage(TimelineStage::Completed, "payment captured".to_string(), None);

        assert_eq!(tx.processing_timeline.len(), 2);
        assert_eq!(tx.processing_timeline[0].stage, TimelineStage::Processing);
        assert_eq!(tx.processing_timeline[1].stage, TimelineStage::Completed);
        assert_eq!(tx.status, TransactionStatus::Successful);
        assert!(tx.settlement_date.is_some());
    }

    #[test]
    fn test_settlement_date_stamped_once() {
        let mut tx = Transaction::new(
            "TXN-2".to_string(),
            "merchant-1".to_string(),
            BigDecimal::from(50),
            DEFAULT_CURRENCY.to_string(),
        );
        tx.apply_stage(TimelineStage::Completed, "first".to_string(), None);
        let stamped = tx.settlement_date;
        tx.apply_stage(TimelineStage::Completed, "redelivery".to_string(), None);
        assert_eq!(tx.settlement_date, stamped);
    }

    #[test]
    fn test_merge_payment_details_union() {
        let mut tx = Transaction::new(
            "TXN-3".to_string(),
            "merchant-1".to_string(),
            BigDecimal::from(10),
            DEFAULT_CURRENCY.to_string(),
        );
        tx.merge_payment_details(&json!({"bank_ref_no": "REF1", "fee": "1.50"}));
        tx.merge_payment_details(&json!({"fee": "2.00", "settlement_id": "SETT9"}));

        assert_eq!(tx.payment_details["bank_ref_no"], "REF1");
        assert_eq!(tx.payment_details["fee"], "2.00");
        assert_eq!(tx.payment_details["settlement_id"], "SETT9");
    }

    #[test]
    fn test_status_round_trips_as_str() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Processing,
            TransactionStatus::Successful,
            TransactionStatus::Failed,
            TransactionStatus::Settled,
            TransactionStatus::Declined,
            TransactionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>(), Ok(status));
        }
    }
}

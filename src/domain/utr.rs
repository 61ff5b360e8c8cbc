//! UTR log entity. One row per bank-issued Unique Transaction Reference,
//! recording the raw webhook payload and how far processing got.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtrProcessingStatus {
    Received,
    Processing,
    Completed,
    Failed,
}

impl UtrProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtrProcessingStatus::Received => "received",
            UtrProcessingStatus::Processing => "processing",
            UtrProcessingStatus::Completed => "completed",
            UtrProcessingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for UtrProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UtrProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(UtrProcessingStatus::Received),
            "processing" => Ok(UtrProcessingStatus::Processing),
            "completed" => Ok(UtrProcessingStatus::Completed),
            "failed" => Ok(UtrProcessingStatus::Failed),
            other => Err(format!("unknown UTR processing status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtrLog {
    pub utr_number: String,
    pub bank_slug: String,
    pub raw_payload: Value,
    pub processing_status: UtrProcessingStatus,
    pub transaction_id: Option<String>,
    pub received_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UtrLog {
    pub fn received(utr_number: String, bank_slug: String, raw_payload: Value) -> Self {
        let now = Utc::now();
        Self {
            utr_number,
            bank_slug,
            raw_payload,
            processing_status: UtrProcessingStatus::Received,
            transaction_id: None,
            received_at: now,
            updated_at: now,
        }
    }
}

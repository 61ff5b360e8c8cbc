//! Canara Bank callback adapter.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{BankEvent, BankId, NormalizedStatus, parse_amount};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CanaraCallback {
    #[serde(alias = "txn_id", alias = "txnId")]
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    pub utr: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub merchant_id: Option<String>,
    #[serde(alias = "bankRefNo")]
    pub bank_ref_no: Option<String>,
}

pub(super) fn normalize_status(raw: &str) -> Option<NormalizedStatus> {
    match raw {
        "SUCCESS" => Some(NormalizedStatus::Successful),
        "FAILED" | "DECLINED" => Some(NormalizedStatus::Failed),
        "PENDING" => Some(NormalizedStatus::Pending),
        _ => None,
    }
}

pub(super) fn adapt(payload: &Value) -> Result<BankEvent, AppError> {
    let callback: CanaraCallback = serde_json::from_value(payload.clone())
        .map_err(|e| AppError::Validation(format!("malformed canara-bank payload: {}", e)))?;

    let raw_status = callback.status.ok_or(AppError::MissingStatus)?;

    let mut provider_fields = json!({});
    if let Some(ref_no) = &callback.bank_ref_no {
        provider_fields["bank_ref_no"] = json!(ref_no);
    }

    Ok(BankEvent {
        bank: BankId::Canara,
        transaction_id: callback.transaction_id,
        utr_number: callback.utr,
        order_id: None,
        raw_status,
        amount: callback.amount.as_ref().and_then(parse_amount),
        currency: callback.currency,
        merchant_id: callback.merchant_id,
        payment_method: None,
        provider_fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapt_txn_id_alias() {
        let payload = json!({"txn_id": "CN-1", "status": "SUCCESS"});
        let event = adapt(&payload).unwrap();
        assert_eq!(event.transaction_id.as_deref(), Some("CN-1"));
    }
}

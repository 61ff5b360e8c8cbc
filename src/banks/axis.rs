//! Axis Bank callback adapter.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{BankEvent, BankId, NormalizedStatus, parse_amount};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AxisCallback {
    #[serde(alias = "transactionId")]
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    pub utr: Option<String>,
    pub reference: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub merchant_id: Option<String>,
    pub settlement_id: Option<String>,
}

pub(super) fn normalize_status(raw: &str) -> Option<NormalizedStatus> {
    match raw {
        "SUCCESS" | "Success" => Some(NormalizedStatus::Successful),
        "FAILED" | "Failure" => Some(NormalizedStatus::Failed),
        "PENDING" | "IN_PROGRESS" => Some(NormalizedStatus::Pending),
        _ => None,
    }
}

pub(super) fn adapt(payload: &Value) -> Result<BankEvent, AppError> {
    let callback: AxisCallback = serde_json::from_value(payload.clone())
        .map_err(|e| AppError::Validation(format!("malformed axis-bank payload: {}", e)))?;

    let raw_status = callback.status.ok_or(AppError::MissingStatus)?;

    let mut provider_fields = json!({});
    if let Some(reference) = &callback.reference {
        provider_fields["reference"] = json!(reference);
    }
    if let Some(settlement_id) = &callback.settlement_id {
        provider_fields["settlement_id"] = json!(settlement_id);
    }

    Ok(BankEvent {
        bank: BankId::Axis,
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

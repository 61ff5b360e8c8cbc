//! SBM Bank callback adapter. SBM notifies on fund transfer, so the UTR is
//! usually the only identifier; `DECLINED` is its terminal failure word and
//! `FAILED` is deliberately not in the table.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{BankEvent, BankId, NormalizedStatus, first_string, parse_amount};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SbmCallback {
    #[serde(alias = "utr_number")]
    pub utr: Option<String>,
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub merchant_id: Option<String>,
    #[serde(alias = "remitterVpa")]
    pub remitter_vpa: Option<String>,
    pub reference: Option<String>,
}

pub(super) fn normalize_status(raw: &str) -> Option<NormalizedStatus> {
    match raw {
        "SUCCESS" | "COMPLETED" => Some(NormalizedStatus::Successful),
        "DECLINED" | "REJECTED" => Some(NormalizedStatus::Failed),
        "PENDING" | "INITIATED" => Some(NormalizedStatus::Pending),
        _ => None,
    }
}

pub(super) fn adapt(payload: &Value) -> Result<BankEvent, AppError> {
    let callback: SbmCallback = serde_json::from_value(payload.clone())
        .map_err(|e| AppError::Validation(format!("malformed sbm-bank payload: {}", e)))?;

    let raw_status = callback.status.ok_or(AppError::MissingStatus)?;

    let mut provider_fields = json!({});
    if let Some(reference) = &callback.reference {
        provider_fields["reference"] = json!(reference);
    }
    if let Some(vpa) = &callback.remitter_vpa {
        provider_fields["payer_vpa"] = json!(vpa);
    }
    if let Some(settlement_id) = first_string(payload, &["settlement_id"]) {
        provider_fields["settlement_id"] = json!(settlement_id);
    }

    Ok(BankEvent {
        bank: BankId::Sbm,
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

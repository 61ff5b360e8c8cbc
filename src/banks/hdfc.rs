//! HDFC Bank callback adapter.
//!
//! HDFC posts UPI collect/intent results with `txnId` as the primary key,
//! a `bankRefNo` processor reference and an optional `utr` once the
//! transfer settles on the NPCI rails.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{BankEvent, BankId, NormalizedStatus, first_string, parse_amount};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct HdfcCallback {
    #[serde(alias = "txnId", alias = "transaction_id")]
    pub txn_id: Option<String>,
    #[serde(alias = "txnStatus")]
    pub status: Option<String>,
    #[serde(alias = "bankRefNo")]
    pub bank_ref_no: Option<String>,
    pub utr: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    #[serde(alias = "merchantId")]
    pub merchant_id: Option<String>,
    #[serde(alias = "paymentMode")]
    pub payment_mode: Option<String>,
    pub fee: Option<Value>,
    pub settlement_id: Option<String>,
}

pub(super) fn normalize_status(raw: &str) -> Option<NormalizedStatus> {
    match raw {
        "SUCCESS" | "success" | "CAPTURED" => Some(NormalizedStatus::Successful),
        "FAILURE" | "FAILED" | "failure" => Some(NormalizedStatus::Failed),
        "PENDING" | "INITIATED" => Some(NormalizedStatus::Pending),
        _ => None,
    }
}

pub(super) fn adapt(payload: &Value) -> Result<BankEvent, AppError> {
    let callback: HdfcCallback = serde_json::from_value(payload.clone())
        .map_err(|e| AppError::Validation(format!("malformed hdfc-bank payload: {}", e)))?;

    let raw_status = callback.status.ok_or(AppError::MissingStatus)?;

    let mut provider_fields = json!({});
    if let Some(ref_no) = &callback.bank_ref_no {
        provider_fields["bank_ref_no"] = json!(ref_no);
    }
    if let Some(fee) = &callback.fee {
        provider_fields["fee"] = fee.clone();
    }
    if let Some(settlement_id) = &callback.settlement_id {
        provider_fields["settlement_id"] = json!(settlement_id);
    }
    if let Some(vpa) = first_string(payload, &["vpa", "payer_vpa", "payerVpa"]) {
        provider_fields["payer_vpa"] = json!(vpa);
    }

    Ok(BankEvent {
        bank: BankId::Hdfc,
        transaction_id: callback.txn_id,
        utr_number: callback.utr,
        order_id: first_string(payload, &["orderId", "order_id"]),
        raw_status,
        amount: callback.amount.as_ref().and_then(parse_amount),
        currency: callback.currency,
        merchant_id: callback.merchant_id,
        payment_method: callback.payment_mode,
        provider_fields,
    })
}

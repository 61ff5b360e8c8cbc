//! ICICI Bank callback adapter. Order-id keyed; the RRN doubles as the UTR
//! on UPI rails.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{BankEvent, BankId, NormalizedStatus, parse_amount};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct IciciCallback {
    #[serde(alias = "order_id")]
    pub order_id: Option<String>,
    #[serde(alias = "transaction_id")]
    pub txn_id: Option<String>,
    #[serde(alias = "txnStatus")]
    pub status: Option<String>,
    pub rrn: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    #[serde(alias = "merchantId")]
    pub merchant_id: Option<String>,
    pub fee: Option<Value>,
}

pub(super) fn normalize_status(raw: &str) -> Option<NormalizedStatus> {
    match raw {
        "SUCCESS" | "TXN_SUCCESS" => Some(NormalizedStatus::Successful),
        "FAILURE" | "TXN_FAILURE" => Some(NormalizedStatus::Failed),
        "PENDING" => Some(NormalizedStatus::Pending),
        _ => None,
    }
}

pub(super) fn adapt(payload: &Value) -> Result<BankEvent, AppError> {
    let callback: IciciCallback = serde_json::from_value(payload.clone())
        .map_err(|e| AppError::Validation(format!("malformed icici-bank payload: {}", e)))?;

    let raw_status = callback.status.ok_or(AppError::MissingStatus)?;

    let mut provider_fields = json!({});
    if let Some(rrn) = &callback.rrn {
        provider_fields["rrn"] = json!(rrn);
    }
    if let Some(fee) = &callback.fee {
        provider_fields["fee"] = fee.clone();
    }

    Ok(BankEvent {
        bank: BankId::Icici,
        transaction_id: callback.txn_id,
        // The RRN correlates the transfer across NPCI systems.
        utr_number: callback.rrn.clone(),
        order_id: callback.order_id,
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
    fn test_order_id_only_payload() {
        let payload = json!({"orderId": "ORD-5", "txnStatus": "TXN_SUCCESS", "rrn": "RRN12"});
        let event = adapt(&payload).unwrap();
        assert_eq!(event.order_id.as_deref(), Some("ORD-5"));
        assert_eq!(event.utr_number.as_deref(), Some("RRN12"));
        assert_eq!(event.correlation_key(), Some("RRN12"));
    }

    #[test]
    fn test_txn_failure_maps_to_failed() {
        assert_eq!(
            normalize_status("TXN_FAILURE"),
            Some(NormalizedStatus::Failed)
        );
    }
}

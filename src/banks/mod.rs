//! Bank integrations. Each bank module owns two things: an adapter that
//! turns that bank's callback payload into one canonical [`BankEvent`], and
//! a status table mapping the bank's vocabulary onto [`NormalizedStatus`].
//! Everything downstream of this module is bank-agnostic.

pub mod axis;
pub mod canara;
pub mod hdfc;
pub mod icici;
pub mod sbm;

use bigdecimal::BigDecimal;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::domain::TimelineStage;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankId {
    Hdfc,
    Sbm,
    Icici,
    Axis,
    Canara,
}

impl BankId {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "hdfc-bank" => Some(BankId::Hdfc),
            "sbm-bank" => Some(BankId::Sbm),
            "icici-bank" => Some(BankId::Icici),
            "axis-bank" => Some(BankId::Axis),
            "canara-bank" => Some(BankId::Canara),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            BankId::Hdfc => "hdfc-bank",
            BankId::Sbm => "sbm-bank",
            BankId::Icici => "icici-bank",
            BankId::Axis => "axis-bank",
            BankId::Canara => "canara-bank",
        }
    }

    pub fn all() -> &'static [BankId] {
        &[
            BankId::Hdfc,
            BankId::Sbm,
            BankId::Icici,
            BankId::Axis,
            BankId::Canara,
        ]
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Tri-state every bank vocabulary collapses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedStatus {
    Successful,
    Failed,
    Pending,
}

impl NormalizedStatus {
    pub fn stage(&self) -> TimelineStage {
        match self {
            NormalizedStatus::Successful => TimelineStage::Completed,
            NormalizedStatus::Failed => TimelineStage::Failed,
            NormalizedStatus::Pending => TimelineStage::Processing,
        }
    }
}

/// Canonical event produced by the per-bank adapters. All shared logic runs
/// against this type; raw payload shapes never leave this module.
#[derive(Debug, Clone)]
pub struct BankEvent {
    pub bank: BankId,
    pub transaction_id: Option<String>,
    pub utr_number: Option<String>,
    pub order_id: Option<String>,
    pub raw_status: String,
    pub amount: Option<BigDecimal>,
    pub currency: Option<String>,
    pub merchant_id: Option<String>,
    pub payment_method: Option<String>,
    /// Processor reference, fee, settlement id and any other bank-specific
    /// fields worth merging into the transaction's payment details.
    pub provider_fields: Value,
}

impl BankEvent {
    /// Correlation key priority: transaction id, then UTR, then order id.
    pub fn correlation_key(&self) -> Option<&str> {
        self.transaction_id
            .as_deref()
            .or(self.utr_number.as_deref())
            .or(self.order_id.as_deref())
    }
}

/// Dispatch to the bank's payload adapter.
pub fn adapt_event(bank: BankId, payload: &Value) -> Result<BankEvent, AppError> {
    match bank {
        BankId::Hdfc => hdfc::adapt(payload),
        BankId::Sbm => sbm::adapt(payload),
        BankId::Icici => icici::adapt(payload),
        BankId::Axis => axis::adapt(payload),
        BankId::Canara => canara::adapt(payload),
    }
}

/// Map a raw status through the bank's table. Unmapped vocabulary degrades
/// to `Pending` so an unexpected string never produces a terminal outcome.
pub fn normalize(bank: BankId, raw_status: &str) -> NormalizedStatus {
    let mapped = match bank {
        BankId::Hdfc => hdfc::normalize_status(raw_status),
        BankId::Sbm => sbm::normalize_status(raw_status),
        BankId::Icici => icici::normalize_status(raw_status),
        BankId::Axis => axis::normalize_status(raw_status),
        BankId::Canara => canara::normalize_status(raw_status),
    };
    match mapped {
        Some(status) => status,
        None => {
            tracing::warn!(bank = %bank, raw_status, "unmapped bank status, treating as pending");
            NormalizedStatus::Pending
        }
    }
}

/// Banks send amounts as strings or JSON numbers; either way the value is
/// carried as a decimal, never a float.
pub(crate) fn parse_amount(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

pub(crate) fn opt_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First non-empty string among aliases, in order.
pub(crate) fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| opt_string(value, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_slugs_resolve() {
        assert_eq!(BankId::from_slug("hdfc-bank"), Some(BankId::Hdfc));
        assert_eq!(BankId::from_slug("sbm-bank"), Some(BankId::Sbm));
        assert_eq!(BankId::from_slug("icici-bank"), Some(BankId::Icici));
        assert_eq!(BankId::from_slug("axis-bank"), Some(BankId::Axis));
        assert_eq!(BankId::from_slug("canara-bank"), Some(BankId::Canara));
    }

    #[test]
    fn test_unknown_slug_rejected() {
        assert_eq!(BankId::from_slug("nowhere-bank"), None);
        assert_eq!(BankId::from_slug(""), None);
        assert_eq!(BankId::from_slug("HDFC-BANK"), None);
    }

    #[test]
    fn test_normalized_status_stage() {
        assert_eq!(
            NormalizedStatus::Successful.stage(),
            TimelineStage::Completed
        );
        assert_eq!(NormalizedStatus::Failed.stage(), TimelineStage::Failed);
        assert_eq!(NormalizedStatus::Pending.stage(), TimelineStage::Processing);
    }

    #[test]
    fn test_hdfc_status_table() {
        assert_eq!(
            normalize(BankId::Hdfc, "SUCCESS"),
            NormalizedStatus::Successful
        );
        assert_eq!(
            normalize(BankId::Hdfc, "CAPTURED"),
            NormalizedStatus::Successful
        );
        assert_eq!(normalize(BankId::Hdfc, "FAILURE"), NormalizedStatus::Failed);
        assert_eq!(normalize(BankId::Hdfc, "FAILED"), NormalizedStatus::Failed);
        assert_eq!(normalize(BankId::Hdfc, "PENDING"), NormalizedStatus::Pending);
    }

    #[test]
    fn test_sbm_declined_maps_to_failed() {
        assert_eq!(normalize(BankId::Sbm, "DECLINED"), NormalizedStatus::Failed);
    }

    #[test]
    fn test_sbm_failed_is_unmapped_and_degrades_to_pending() {
        // sbm-bank's vocabulary has no FAILED entry; the lenient default
        // must hold rather than guessing a terminal state.
        assert_eq!(normalize(BankId::Sbm, "FAILED"), NormalizedStatus::Pending);
    }

    #[test]
    fn test_unknown_status_never_terminal_for_any_bank() {
        for bank in BankId::all() {
            let status = normalize(*bank, "SOME_NEW_VOCABULARY");
            assert_eq!(status, NormalizedStatus::Pending, "bank {}", bank);
        }
    }

    #[test]
    fn test_correlation_key_priority() {
        let mut event = BankEvent {
            bank: BankId::Hdfc,
            transaction_id: Some("TXN1".to_string()),
            utr_number: Some("UTR1".to_string()),
            order_id: Some("ORD1".to_string()),
            raw_status: "SUCCESS".to_string(),
            amount: None,
            currency: None,
            merchant_id: None,
            payment_method: None,
            provider_fields: json!({}),
        };
        assert_eq!(event.correlation_key(), Some("TXN1"));

        event.transaction_id = None;
        assert_eq!(event.correlation_key(), Some("UTR1"));

        event.utr_number = None;
        assert_eq!(event.correlation_key(), Some("ORD1"));

        event.order_id = None;
        assert_eq!(event.correlation_key(), None);
    }

    #[test]
    fn test_parse_amount_accepts_string_and_number() {
        assert_eq!(
            parse_amount(&json!("150.25")),
            Some("150.25".parse().unwrap())
        );
        assert_eq!(parse_amount(&json!(150)), Some(BigDecimal::from(150)));
        assert_eq!(parse_amount(&json!(null)), None);
        assert_eq!(parse_amount(&json!("not-a-number")), None);
    }
}

//! Bank webhook entry point. One request walks received → validated →
//! resolved → updated → (wallet-credited) → responded; validation failures
//! are 4xx, persistence failures from resolution onward are 5xx, wallet
//! failures are logged and acknowledged anyway so the bank stops retrying
//! a payment that is already recorded.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use utoipa::ToSchema;

use crate::AppState;
use crate::banks::{self, BankId};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/{bank_slug}/callback",
    params(
        ("bank_slug" = String, Path, description = "Registered bank identifier, e.g. hdfc-bank")
    ),
    responses(
        (status = 200, description = "Webhook reconciled", body = WebhookResponse),
        (status = 400, description = "Unknown bank, or payload missing status/correlation key", body = WebhookResponse),
        (status = 401, description = "Signature verification failed", body = WebhookResponse),
        (status = 500, description = "Store failure; the bank should redeliver", body = WebhookResponse)
    ),
    tag = "Webhooks"
)]
pub async fn bank_callback(
    State(state): State<AppState>,
    Path(bank_slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let bank = BankId::from_slug(&bank_slug).ok_or(AppError::UnsupportedProvider(bank_slug))?;

    if let Some(secret) = state.config.webhook_secret_for(bank) {
        verify_signature(secret, &body, &headers)?;
    }

    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)))?;

    let event = banks::adapt_event(bank, &payload)?;

    let outcome = state.reconciliation.process(&event, &payload).await?;

    match state.wallet.credit_on_success(&outcome).await {
        Ok(Some(entry)) => {
            tracing::debug!(ledger_entry_id = %entry.id, "wallet credit posted");
        }
        Ok(None) => {}
        // Non-fatal: the status update is already durable.
        Err(e) => {
            tracing::error!(
                transaction_id = %outcome.transaction.id,
                error = %e,
                "wallet credit failed after successful reconciliation"
            );
        }
    }

    Ok(Json(WebhookResponse {
        status: "success".to_string(),
        message: format!(
            "{} webhook processed, transaction {}",
            bank,
            outcome.transaction.status
        ),
        transaction_id: Some(outcome.transaction.id),
        payment_status: Some(outcome.transaction.status.to_string()),
    }))
}

/// Constant-time HMAC-SHA256 check over the raw body. The signature header
/// carries a hex digest.
fn verify_signature(secret: &str, body: &[u8], headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    let signature = hex::decode(provided.trim()).map_err(|_| AppError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidSignature)
}

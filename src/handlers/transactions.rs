use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::domain::Transaction;
use crate::error::AppError;
use crate::ports::TransactionRepository;

#[utoipa::path(
    get,
    path = "/transactions/{id}",
    params(
        ("id" = String, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction found", body = Transaction),
        (status = 404, description = "No such transaction")
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state
        .transactions
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?
        .ok_or_else(|| AppError::TransactionNotFound(id))?;

    Ok(Json(tx))
}

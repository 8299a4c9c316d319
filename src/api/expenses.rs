use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode},
};

use crate::{
    error::ApiError,
    info,
    types::{Expense, ExpensePatch, NewExpense, SuccessResponse},
    warning,
};

use super::{AppState, invalid_body, invalid_path};

/// Request header carrying the caller's retry key for `POST /expenses`.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Handles `GET /expenses`.
///
/// Returns every stored record in insertion order. Listing never fails; an
/// empty store yields `[]`.
pub async fn list_expenses(State(state): State<AppState>) -> Json<Vec<Expense>> {
    Json(state.expenses.list())
}

/// Handles `POST /expenses`.
///
/// Coerces `amount` to a number and normalizes `date` before the store
/// allocates an id. Unknown fields are stored verbatim.
///
/// # Headers
///
/// * `Idempotency-Key` - Optional. A repeated key returns the record created
///   by the first request instead of creating another one.
///
/// # Returns
///
/// - `201 Created` with the stored record
/// - `400 Bad Request` for malformed JSON, a missing `amount`/`date`, or a
///   value that cannot be coerced
pub async fn create_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let Json(draft) = payload.map_err(invalid_body)?;
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let expense = state
        .expenses
        .create(draft, key)
        .inspect_err(|e| warning!("Rejected expense: {}", e))?;

    info!("Created expense {}", expense.id);
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Handles `PUT /expenses`, with the target id taken from the body.
///
/// Only the fields present in the body change; `amount` and `date` are
/// re-validated when given.
///
/// # Returns
///
/// - `200 OK` with the merged record
/// - `400 Bad Request` when the body has no `id` or carries invalid values
/// - `404 Not Found` when no record has that id
pub async fn update_expense(
    State(state): State<AppState>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> Result<Json<Expense>, ApiError> {
    let Json(patch) = payload.map_err(invalid_body)?;
    let id = patch
        .id
        .ok_or_else(|| ApiError::Validation("Field 'id' is required".to_string()))?;

    apply_update(&state, id, patch)
}

/// Handles `PUT /expenses/{id}`. The path id wins over any `id` in the body.
pub async fn update_expense_by_id(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> Result<Json<Expense>, ApiError> {
    let Path(id) = path.map_err(invalid_path)?;
    let Json(patch) = payload.map_err(invalid_body)?;

    apply_update(&state, id, patch)
}

/// Handles `DELETE /expenses/{id}`.
///
/// # Returns
///
/// - `200 OK` with `{"success": true}`
/// - `404 Not Found` when no record has that id, including a second delete
pub async fn delete_expense(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = path.map_err(invalid_path)?;

    state
        .expenses
        .delete(id)
        .inspect_err(|e| warning!("Rejected delete of expense {}: {}", id, e))?;

    info!("Deleted expense {}", id);
    Ok(Json(SuccessResponse { success: true }))
}

fn apply_update(state: &AppState, id: u64, patch: ExpensePatch) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .expenses
        .update(id, patch)
        .inspect_err(|e| warning!("Rejected update of expense {}: {}", id, e))?;

    info!("Updated expense {}", id);
    Ok(Json(expense))
}

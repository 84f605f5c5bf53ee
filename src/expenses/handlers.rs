use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateExpenseRequest, MessageResponse, UpdateExpenseRequest},
    repo_types::{Expense, ExpensePatch, NewExpense},
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/analytics", get(analytics))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

// Malformed ids get the same answer as unknown ones.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

#[instrument(skip(state, body))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let fields = NewExpense::try_from(body).inspect_err(|e| {
        warn!(%user_id, error = %e, "rejected expense input");
    })?;
    let expense = state.expenses.create(user_id, fields).await;
    info!(%user_id, expense_id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<Vec<Expense>> {
    Json(state.expenses.list_by_owner(user_id).await)
}

#[instrument(skip(state, body))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    let id = parse_id(&id)?;
    let patch = ExpensePatch::try_from(body)?;
    let expense = state.expenses.update(user_id, id, patch).await.map_err(|e| {
        warn!(%user_id, expense_id = %id, "update on missing expense");
        AppError::from(e)
    })?;
    info!(%user_id, expense_id = %id, "expense updated");
    Ok(Json(expense))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    if !state.expenses.delete(user_id, id).await {
        warn!(%user_id, expense_id = %id, "delete on missing expense");
        return Err(AppError::NotFound);
    }
    info!(%user_id, expense_id = %id, "expense deleted");
    Ok(Json(MessageResponse {
        message: "Expense deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<BTreeMap<String, f64>> {
    Json(state.expenses.aggregate_by_category(user_id).await)
}

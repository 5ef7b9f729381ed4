//! Operator endpoints: register, list, view and archive van operators.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{ArchivePersonRequest, ArchivePersonResponse, CreateOperatorRequest, Operator};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::extract::{ApiJson, ApiPath};
use super::validation::{validate_id, validate_personal_details};

fn validate_create_request(req: &CreateOperatorRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    validate_personal_details(&req.details, &mut errors);
    errors.finish()
}

pub(crate) async fn find_active_operator(
    state: &AppState,
    id: i64,
) -> Result<Operator, ApiError> {
    sqlx::query_as::<_, Operator>("SELECT * FROM operators WHERE id = ? AND archived = 0")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Operator not found"))
}

/// List active operators
///
/// GET /api/operators
pub async fn list_operators(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Operator>>, ApiError> {
    let operators = sqlx::query_as::<_, Operator>(
        "SELECT * FROM operators WHERE archived = 0 ORDER BY id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(operators))
}

/// GET /api/operators/:id
pub async fn get_operator(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Operator>, ApiError> {
    if let Err(e) = validate_id(id, "operator id") {
        return Err(ApiError::validation_field("id", e));
    }

    Ok(Json(find_active_operator(&state, id).await?))
}

/// Register an operator
///
/// POST /api/operators
pub async fn create_operator(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateOperatorRequest>,
) -> Result<(StatusCode, Json<Operator>), ApiError> {
    validate_create_request(&req)?;

    let now = chrono::Utc::now().to_rfc3339();
    let d = &req.details;

    let result = sqlx::query(
        r#"
        INSERT INTO operators (
            firstname, middlename, lastname, contact, region, city, brgy, street, kind,
            emergency_name, emergency_address, emergency_contact, archived, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(d.firstname.trim())
    .bind(d.middlename.trim())
    .bind(d.lastname.trim())
    .bind(d.contact.trim())
    .bind(d.region.trim())
    .bind(d.city.trim())
    .bind(d.brgy.trim())
    .bind(d.street.trim())
    .bind(d.kind.trim())
    .bind(d.emergency_name.trim())
    .bind(d.emergency_address.trim())
    .bind(d.emergency_contact.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let id = result.last_insert_rowid();
    let operator = sqlx::query_as::<_, Operator>("SELECT * FROM operators WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    info!(operator_id = id, name = %operator.details.full_name(), "Operator registered");

    Ok((StatusCode::CREATED, Json(operator)))
}

/// Archive an operator. The record is flagged, never removed, so existing
/// assignments keep their history.
///
/// DELETE /api/operators  (body: `{"id": ...}`)
pub async fn archive_operator(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ArchivePersonRequest>,
) -> Result<Json<ArchivePersonResponse>, ApiError> {
    if let Err(e) = validate_id(req.id, "operator id") {
        return Err(ApiError::validation_field("id", e));
    }

    find_active_operator(&state, req.id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE operators SET archived = 1, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(req.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Operator not found"));
    }

    info!(operator_id = req.id, "Operator archived");

    Ok(Json(ArchivePersonResponse {
        id: req.id,
        archived: true,
        message: "Operator archived successfully".to_string(),
    }))
}

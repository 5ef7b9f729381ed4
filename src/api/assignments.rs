//! Assignment endpoints: pair operators' vans with drivers.
//!
//! A driver may hold at most one active (non-archived) assignment. The check
//! is folded into the UPDATE itself so two concurrent requests cannot both
//! claim the same driver.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{
    AssignDriverRequest, Assignment, AssignmentRow, CreateAssignmentRequest,
    UpdateAssignmentRequest, Van,
};
use crate::AppState;

use super::drivers::find_active_driver;
use super::error::{ApiError, ValidationErrorBuilder};
use super::extract::ApiJson;
use super::operators::find_active_operator;
use super::validation::validate_id;

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.operator_id, a.van_id, a.driver_id, a.archived, a.created_at, a.updated_at,
           o.firstname AS operator_firstname, o.lastname AS operator_lastname,
           v.plate_number AS van_plate_number,
           d.firstname AS driver_firstname, d.lastname AS driver_lastname
    FROM assignments a
    JOIN operators o ON o.id = a.operator_id
    JOIN vans v ON v.id = a.van_id
    LEFT JOIN drivers d ON d.id = a.driver_id
"#;

async fn fetch_assignment(state: &AppState, id: i64) -> Result<Option<Assignment>, ApiError> {
    let row = sqlx::query_as::<_, AssignmentRow>(&format!("{} WHERE a.id = ?", ASSIGNMENT_SELECT))
        .bind(id)
        .fetch_optional(&state.db)
        .await?;

    Ok(row.map(Assignment::from))
}

/// Id of the active assignment currently holding `driver_id`, if any
async fn active_assignment_for_driver(
    state: &AppState,
    driver_id: i64,
) -> Result<Option<i64>, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM assignments WHERE driver_id = ? AND archived = 0 LIMIT 1",
    )
    .bind(driver_id)
    .fetch_optional(&state.db)
    .await?;

    Ok(row.map(|(id,)| id))
}

/// List all assignments, archived ones included, with their operator, van
/// and driver embedded
///
/// GET /api/assignments
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let rows = sqlx::query_as::<_, AssignmentRow>(&format!("{} ORDER BY a.id", ASSIGNMENT_SELECT))
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Assignment::from).collect()))
}

/// Pair an operator with a van, optionally with a driver already
///
/// POST /api/assignments
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_id(req.operator_id, "operator_id") {
        errors.add("operator_id", e);
    }
    if let Err(e) = validate_id(req.van_id, "van_id") {
        errors.add("van_id", e);
    }
    if let Some(driver_id) = req.driver_id {
        if let Err(e) = validate_id(driver_id, "driver_id") {
            errors.add("driver_id", e);
        }
    }
    errors.finish()?;

    find_active_operator(&state, req.operator_id).await?;

    sqlx::query_as::<_, Van>("SELECT * FROM vans WHERE id = ?")
        .bind(req.van_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Van not found"))?;

    let van_in_use: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM assignments WHERE van_id = ? AND archived = 0 LIMIT 1")
            .bind(req.van_id)
            .fetch_optional(&state.db)
            .await?;
    if van_in_use.is_some() {
        return Err(ApiError::conflict("Van already has an active assignment"));
    }

    if let Some(driver_id) = req.driver_id {
        find_active_driver(&state, driver_id).await?;
        if active_assignment_for_driver(&state, driver_id).await?.is_some() {
            return Err(ApiError::conflict("Driver is already assigned to another van"));
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO assignments (operator_id, van_id, driver_id, archived, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(req.operator_id)
    .bind(req.van_id)
    .bind(req.driver_id)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let id = result.last_insert_rowid();
    let assignment = fetch_assignment(&state, id)
        .await?
        .ok_or_else(|| ApiError::internal("Assignment disappeared after insert"))?;

    info!(
        assignment_id = id,
        operator_id = req.operator_id,
        van_id = req.van_id,
        "Assignment created"
    );

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Link a driver to an assignment, replacing any previous driver
///
/// POST /api/assignments/assignDriver
pub async fn assign_driver(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AssignDriverRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_id(req.assignment_id, "assignment_id") {
        errors.add("assignment_id", e);
    }
    if let Err(e) = validate_id(req.driver_id, "driver_id") {
        errors.add("driver_id", e);
    }
    errors.finish()?;

    let assignment = fetch_assignment(&state, req.assignment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    if assignment.archived {
        return Err(ApiError::bad_request("Cannot assign a driver to an archived assignment"));
    }

    find_active_driver(&state, req.driver_id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        UPDATE assignments SET driver_id = ?, updated_at = ?
        WHERE id = ? AND archived = 0
          AND NOT EXISTS (
              SELECT 1 FROM assignments
              WHERE driver_id = ? AND archived = 0 AND id != ?
          )
        "#,
    )
    .bind(req.driver_id)
    .bind(&now)
    .bind(req.assignment_id)
    .bind(req.driver_id)
    .bind(req.assignment_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        // Either another request archived the assignment or the driver is taken
        return match active_assignment_for_driver(&state, req.driver_id).await? {
            Some(holder) if holder != req.assignment_id => {
                warn!(
                    driver_id = req.driver_id,
                    held_by = holder,
                    "Driver already holds an active assignment"
                );
                Err(ApiError::conflict("Driver is already assigned to another van"))
            }
            _ => Err(ApiError::bad_request(
                "Cannot assign a driver to an archived assignment",
            )),
        };
    }

    let updated = fetch_assignment(&state, req.assignment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    info!(
        assignment_id = req.assignment_id,
        driver_id = req.driver_id,
        previous_driver = ?assignment.driver_id,
        "Driver assigned"
    );

    Ok(Json(updated))
}

/// Archive (or restore) an assignment. Archiving is a soft flag; the row and
/// its driver link are kept.
///
/// PUT /api/assignments
pub async fn update_assignment(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    if let Err(e) = validate_id(req.id, "assignment id") {
        return Err(ApiError::validation_field("id", e));
    }

    let existing = fetch_assignment(&state, req.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    // Restoring must not hand out a driver that moved on in the meantime
    if existing.archived && !req.archived {
        if let Some(driver_id) = existing.driver_id {
            if active_assignment_for_driver(&state, driver_id).await?.is_some() {
                return Err(ApiError::conflict(
                    "Driver is already assigned to another van",
                ));
            }
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE assignments SET archived = ?, updated_at = ? WHERE id = ?")
        .bind(req.archived)
        .bind(&now)
        .bind(req.id)
        .execute(&state.db)
        .await?;

    let updated = fetch_assignment(&state, req.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    info!(assignment_id = req.id, archived = req.archived, "Assignment updated");

    Ok(Json(updated))
}

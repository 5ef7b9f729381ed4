//! Driver endpoints: register, list, view and archive drivers.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{ArchivePersonRequest, ArchivePersonResponse, CreateDriverRequest, Driver};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::extract::{ApiJson, ApiPath};
use super::validation::{
    validate_id, validate_license_details, validate_personal_details, validate_required,
};

/// Driver registrations need everything an operator needs plus the license
/// block and a driver type.
fn validate_create_request(req: &CreateDriverRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    validate_personal_details(&req.details, &mut errors);
    validate_license_details(&req.license, &mut errors);

    if let Err(e) = validate_required(&req.details.kind, "Type") {
        errors.add("type", e);
    }

    errors.finish()
}

pub(crate) async fn find_active_driver(state: &AppState, id: i64) -> Result<Driver, ApiError> {
    sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = ? AND archived = 0")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Driver not found"))
}

/// List active drivers
///
/// GET /api/drivers
pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Driver>>, ApiError> {
    let drivers =
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE archived = 0 ORDER BY id")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(drivers))
}

/// GET /api/drivers/:id
pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Driver>, ApiError> {
    if let Err(e) = validate_id(id, "driver id") {
        return Err(ApiError::validation_field("id", e));
    }

    Ok(Json(find_active_driver(&state, id).await?))
}

/// Register a driver
///
/// POST /api/drivers
pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<Driver>), ApiError> {
    validate_create_request(&req)?;

    let now = chrono::Utc::now().to_rfc3339();
    let d = &req.details;
    let l = &req.license;

    let result = sqlx::query(
        r#"
        INSERT INTO drivers (
            firstname, middlename, lastname, contact, region, city, brgy, street, kind,
            emergency_name, emergency_address, emergency_contact,
            license_no, dl_codes, conditions, expiration_date,
            archived, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
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
    .bind(l.license_no.trim())
    .bind(l.dl_codes.trim())
    .bind(l.conditions.trim())
    .bind(l.expiration_date.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let id = result.last_insert_rowid();
    let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    info!(driver_id = id, license_no = %driver.license.license_no, "Driver registered");

    Ok((StatusCode::CREATED, Json(driver)))
}

/// Archive a driver. Any active assignment keeps pointing at the driver
/// until it is reassigned or archived itself.
///
/// DELETE /api/drivers  (body: `{"id": ...}`)
pub async fn archive_driver(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ArchivePersonRequest>,
) -> Result<Json<ArchivePersonResponse>, ApiError> {
    if let Err(e) = validate_id(req.id, "driver id") {
        return Err(ApiError::validation_field("id", e));
    }

    find_active_driver(&state, req.id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE drivers SET archived = 1, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(req.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Driver not found"));
    }

    info!(driver_id = req.id, "Driver archived");

    Ok(Json(ArchivePersonResponse {
        id: req.id,
        archived: true,
        message: "Driver archived successfully".to_string(),
    }))
}

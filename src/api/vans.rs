//! Van endpoints.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::db::{CreateVanRequest, Van};
use crate::AppState;

use super::error::ApiError;
use super::extract::ApiJson;
use super::validation::validate_plate_number;

/// GET /api/vans
pub async fn list_vans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Van>>, ApiError> {
    let vans = sqlx::query_as::<_, Van>("SELECT * FROM vans ORDER BY plate_number")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(vans))
}

/// Register a van. Plate numbers are stored upper-cased so lookups and the
/// uniqueness constraint ignore case.
///
/// POST /api/vans
pub async fn create_van(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateVanRequest>,
) -> Result<(StatusCode, Json<Van>), ApiError> {
    if let Err(e) = validate_plate_number(&req.plate_number) {
        return Err(ApiError::validation_field("plate_number", e));
    }

    let plate_number = req.plate_number.trim().to_uppercase();
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("INSERT INTO vans (plate_number, created_at) VALUES (?, ?)")
        .bind(&plate_number)
        .bind(&now)
        .execute(&state.db)
        .await?;

    let van = Van {
        id: result.last_insert_rowid(),
        plate_number,
        created_at: now,
    };

    info!(van_id = van.id, plate_number = %van.plate_number, "Van registered");

    Ok((StatusCode::CREATED, Json(van)))
}

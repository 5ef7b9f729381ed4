//! Van models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Van {
    pub id: i64,
    pub plate_number: String,
    #[serde(default)]
    pub created_at: String,
}

/// Compact van reference embedded in assignment payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanSummary {
    pub id: i64,
    pub plate_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVanRequest {
    pub plate_number: String,
}

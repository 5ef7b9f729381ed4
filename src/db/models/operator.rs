//! Operator models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::person::PersonalDetails;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Operator {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Operator registration payload. The operator form never sends license fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOperatorRequest {
    #[serde(flatten)]
    pub details: PersonalDetails,
}

//! Driver models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::person::{LicenseDetails, PersonalDetails};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: PersonalDetails,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub license: LicenseDetails,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Driver registration payload: the operator fields plus the license block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDriverRequest {
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(flatten)]
    pub license: LicenseDetails,
}

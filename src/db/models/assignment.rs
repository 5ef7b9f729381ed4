//! Assignment models and DTOs.
//!
//! An assignment pairs an operator with one of their vans and, optionally, a
//! driver. The wire format embeds the related records under capitalised keys
//! (`Operator`, `Van`, `Driver`), which is what the admin console consumes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::person::PersonSummary;
use super::van::VanSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    #[serde(default)]
    pub operator_id: i64,
    #[serde(default)]
    pub van_id: i64,
    #[serde(rename = "Operator")]
    pub operator: PersonSummary,
    #[serde(rename = "Van")]
    pub van: VanSummary,
    pub driver_id: Option<i64>,
    #[serde(rename = "Driver", default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<PersonSummary>,
    pub archived: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Assignment {
    /// Active assignments hold a driver and are not archived
    pub fn has_active_driver(&self) -> bool {
        self.driver_id.is_some() && !self.archived
    }

    /// Dropdown label: operator name followed by the van's plate
    pub fn label(&self) -> String {
        format!("{} - {}", self.operator.display_name(), self.van.plate_number)
    }
}

/// Flat row produced by the assignment listing join
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub id: i64,
    pub operator_id: i64,
    pub van_id: i64,
    pub driver_id: Option<i64>,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
    pub operator_firstname: String,
    pub operator_lastname: String,
    pub van_plate_number: String,
    pub driver_firstname: Option<String>,
    pub driver_lastname: Option<String>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        let driver = match (row.driver_id, row.driver_firstname, row.driver_lastname) {
            (Some(id), Some(firstname), Some(lastname)) => Some(PersonSummary {
                id,
                firstname,
                lastname,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            operator_id: row.operator_id,
            van_id: row.van_id,
            operator: PersonSummary {
                id: row.operator_id,
                firstname: row.operator_firstname,
                lastname: row.operator_lastname,
            },
            van: VanSummary {
                id: row.van_id,
                plate_number: row.van_plate_number,
            },
            driver_id: row.driver_id,
            driver,
            archived: row.archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub operator_id: i64,
    pub van_id: i64,
    #[serde(default)]
    pub driver_id: Option<i64>,
}

/// Body of `POST /api/assignments/assignDriver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignDriverRequest {
    pub assignment_id: i64,
    pub driver_id: i64,
}

/// Body of `PUT /api/assignments`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub id: i64,
    pub archived: bool,
}

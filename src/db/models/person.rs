//! Fields shared by operators and drivers.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name, address and emergency contact of a registered person.
///
/// Operators and drivers share this block; a driver adds [`LicenseDetails`].
/// Every field defaults to an empty string so that incomplete payloads reach
/// validation instead of failing JSON extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct PersonalDetails {
    pub firstname: String,
    pub middlename: String,
    pub lastname: String,
    pub contact: String,
    pub region: String,
    pub city: String,
    pub brgy: String,
    pub street: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub emergency_name: String,
    pub emergency_address: String,
    pub emergency_contact: String,
}

impl PersonalDetails {
    pub fn full_name(&self) -> String {
        if self.middlename.is_empty() {
            format!("{} {}", self.firstname, self.lastname)
        } else {
            format!("{} {} {}", self.firstname, self.middlename, self.lastname)
        }
    }
}

/// Driver's license block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct LicenseDetails {
    pub license_no: String,
    pub dl_codes: String,
    pub conditions: String,
    /// `YYYY-MM-DD`
    pub expiration_date: String,
}

/// Compact person reference embedded in assignment payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
}

impl PersonSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Body of the archive (DELETE) endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArchivePersonRequest {
    pub id: i64,
}

/// Response of the archive (DELETE) endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivePersonResponse {
    pub id: i64,
    pub archived: bool,
    pub message: String,
}

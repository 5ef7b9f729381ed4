//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{LicenseDetails, PersonalDetails};

use super::error::ValidationErrorBuilder;

lazy_static! {
    /// Regex for phone numbers: optional leading +, digits with spaces or dashes
    static ref CONTACT_NUMBER_REGEX: Regex = Regex::new(
        r"^\+?[0-9][0-9 \-]{5,18}[0-9]$"
    ).unwrap();

    /// Regex for van plate numbers (e.g., ABC-1234, ABC 123, NBC1234)
    static ref PLATE_NUMBER_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9 \-]{0,10}[A-Za-z0-9])$"
    ).unwrap();
}

/// Longest accepted free-text field
const MAX_TEXT_LENGTH: usize = 255;

/// Validate a required free-text field
pub fn validate_required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }

    if value.len() > MAX_TEXT_LENGTH {
        return Err(format!(
            "{} is too long (max {} characters)",
            label, MAX_TEXT_LENGTH
        ));
    }

    Ok(())
}

/// Validate a contact number
pub fn validate_contact_number(contact: &str, label: &str) -> Result<(), String> {
    validate_required(contact, label)?;

    if !CONTACT_NUMBER_REGEX.is_match(contact.trim()) {
        return Err(format!(
            "{} must be a phone number (digits, spaces or dashes, optional leading '+')",
            label
        ));
    }

    Ok(())
}

/// Validate a license expiration date in `YYYY-MM-DD` form
pub fn validate_expiration_date(date: &str) -> Result<(), String> {
    if date.trim().is_empty() {
        return Err("Expiration date is required".to_string());
    }

    if NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").is_err() {
        return Err("Expiration date must use the YYYY-MM-DD format".to_string());
    }

    Ok(())
}

/// Validate a van plate number
pub fn validate_plate_number(plate: &str) -> Result<(), String> {
    if plate.trim().is_empty() {
        return Err("Plate number is required".to_string());
    }

    if !PLATE_NUMBER_REGEX.is_match(plate.trim()) {
        return Err("Invalid plate number format".to_string());
    }

    Ok(())
}

/// Validate a record identifier
pub fn validate_id(id: i64, field_name: &str) -> Result<(), String> {
    if id < 1 {
        return Err(format!("Invalid {}", field_name));
    }
    Ok(())
}

/// Collect errors for the fields shared by operators and drivers.
/// `type` is only required for drivers, so it is left to the caller.
pub fn validate_personal_details(details: &PersonalDetails, errors: &mut ValidationErrorBuilder) {
    let required = [
        ("firstname", "First name", &details.firstname),
        ("middlename", "Middle name", &details.middlename),
        ("lastname", "Last name", &details.lastname),
        ("region", "Region", &details.region),
        ("city", "City", &details.city),
        ("brgy", "Barangay", &details.brgy),
        ("street", "Street", &details.street),
        ("emergency_name", "Emergency contact name", &details.emergency_name),
        (
            "emergency_address",
            "Emergency contact address",
            &details.emergency_address,
        ),
    ];

    for (field, label, value) in required {
        if let Err(e) = validate_required(value, label) {
            errors.add(field, e);
        }
    }

    if let Err(e) = validate_contact_number(&details.contact, "Contact") {
        errors.add("contact", e);
    }

    if let Err(e) = validate_contact_number(&details.emergency_contact, "Emergency contact number")
    {
        errors.add("emergency_contact", e);
    }
}

/// Collect errors for a driver's license block
pub fn validate_license_details(license: &LicenseDetails, errors: &mut ValidationErrorBuilder) {
    if let Err(e) = validate_required(&license.license_no, "License number") {
        errors.add("license_no", e);
    }

    if let Err(e) = validate_required(&license.dl_codes, "DL codes") {
        errors.add("dl_codes", e);
    }

    if let Err(e) = validate_required(&license.conditions, "Conditions") {
        errors.add("conditions", e);
    }

    if let Err(e) = validate_expiration_date(&license.expiration_date) {
        errors.add("expiration_date", e);
    }
}

//! People directory: register operators and drivers, browse the merged list,
//! view and archive records.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use super::client::{ClientError, DispatchApi, Role};
use super::notification::Notification;
use super::pagination::Paginator;
use crate::config::ConsoleConfig;
use crate::db::{
    CreateDriverRequest, CreateOperatorRequest, Driver, LicenseDetails, Operator,
    PersonalDetails,
};

/// Required in both modes
const PERSON_REQUIRED: [&str; 11] = [
    "firstname",
    "middlename",
    "lastname",
    "contact",
    "region",
    "city",
    "brgy",
    "street",
    "emergency_name",
    "emergency_address",
    "emergency_contact",
];

/// Additionally required in driver mode
const DRIVER_REQUIRED: [&str; 5] = [
    "license_no",
    "type",
    "dl_codes",
    "conditions",
    "expiration_date",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

/// Registration form state shared by both modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    is_driver: bool,
    details: PersonalDetails,
    license: LicenseDetails,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            is_driver: true,
            details: PersonalDetails::default(),
            license: LicenseDetails::default(),
        }
    }
}

impl RegistrationForm {
    pub fn is_driver(&self) -> bool {
        self.is_driver
    }

    pub fn set_driver_mode(&mut self, is_driver: bool) {
        self.is_driver = is_driver;
    }

    pub fn toggle_mode(&mut self) {
        self.is_driver = !self.is_driver;
    }

    pub fn role(&self) -> Role {
        if self.is_driver {
            Role::Driver
        } else {
            Role::Operator
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        let d = &mut self.details;
        let l = &mut self.license;
        Some(match name {
            "firstname" => &mut d.firstname,
            "middlename" => &mut d.middlename,
            "lastname" => &mut d.lastname,
            "contact" => &mut d.contact,
            "region" => &mut d.region,
            "city" => &mut d.city,
            "brgy" => &mut d.brgy,
            "street" => &mut d.street,
            "type" => &mut d.kind,
            "emergency_name" => &mut d.emergency_name,
            "emergency_address" => &mut d.emergency_address,
            "emergency_contact" => &mut d.emergency_contact,
            "license_no" => &mut l.license_no,
            "dl_codes" => &mut l.dl_codes,
            "conditions" => &mut l.conditions,
            "expiration_date" => &mut l.expiration_date,
            _ => return None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        let d = &self.details;
        let l = &self.license;
        let value = match name {
            "firstname" => &d.firstname,
            "middlename" => &d.middlename,
            "lastname" => &d.lastname,
            "contact" => &d.contact,
            "region" => &d.region,
            "city" => &d.city,
            "brgy" => &d.brgy,
            "street" => &d.street,
            "type" => &d.kind,
            "emergency_name" => &d.emergency_name,
            "emergency_address" => &d.emergency_address,
            "emergency_contact" => &d.emergency_contact,
            "license_no" => &l.license_no,
            "dl_codes" => &l.dl_codes,
            "conditions" => &l.conditions,
            "expiration_date" => &l.expiration_date,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Set a field by its wire name
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let slot = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields = PERSON_REQUIRED.to_vec();
        if self.is_driver {
            fields.extend_from_slice(&DRIVER_REQUIRED);
        }
        fields
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.required_fields()
            .into_iter()
            .filter(|name| self.field(name).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Operator payload; license fields are never sent
    pub fn operator_payload(&self) -> CreateOperatorRequest {
        CreateOperatorRequest {
            details: self.details.clone(),
        }
    }

    pub fn driver_payload(&self) -> CreateDriverRequest {
        CreateDriverRequest {
            details: self.details.clone(),
            license: self.license.clone(),
        }
    }

    /// Clear every field, keeping the current mode
    pub fn reset(&mut self) {
        self.details = PersonalDetails::default();
        self.license = LicenseDetails::default();
    }
}

/// Identifies a row of the merged list. Operators and drivers live in
/// separate tables, so the id alone is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonKey {
    pub role: Role,
    pub id: i64,
}

impl PersonKey {
    pub fn new(role: Role, id: i64) -> Self {
        Self { role, id }
    }
}

/// A row of the merged people list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Person<'a> {
    Operator(&'a Operator),
    Driver(&'a Driver),
}

impl<'a> Person<'a> {
    pub fn role(&self) -> Role {
        match self {
            Person::Operator(_) => Role::Operator,
            Person::Driver(_) => Role::Driver,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Person::Operator(o) => o.id,
            Person::Driver(d) => d.id,
        }
    }

    pub fn key(&self) -> PersonKey {
        PersonKey::new(self.role(), self.id())
    }

    pub fn details(&self) -> &'a PersonalDetails {
        match self {
            Person::Operator(o) => &o.details,
            Person::Driver(d) => &d.details,
        }
    }

    pub fn license(&self) -> Option<&'a LicenseDetails> {
        match self {
            Person::Operator(_) => None,
            Person::Driver(d) => Some(&d.license),
        }
    }
}

pub struct PeopleDirectory<A: DispatchApi> {
    api: A,
    operators: Vec<Operator>,
    drivers: Vec<Driver>,
    form: RegistrationForm,
    register_open: bool,
    selected: Option<PersonKey>,
    view_open: bool,
    editing: bool,
    pending_archive: Option<PersonKey>,
    paginator: Paginator,
    alert_timeout: Duration,
    notification: Notification,
}

impl<A: DispatchApi> PeopleDirectory<A> {
    pub fn new(api: A, page_size: usize, alert_timeout: Duration) -> Self {
        Self {
            api,
            operators: Vec::new(),
            drivers: Vec::new(),
            form: RegistrationForm::default(),
            register_open: false,
            selected: None,
            view_open: false,
            editing: false,
            pending_archive: None,
            paginator: Paginator::new(page_size),
            alert_timeout,
            notification: Notification::None,
        }
    }

    pub fn from_config(api: A, config: &ConsoleConfig) -> Self {
        Self::new(api, config.page_size, config.alert_timeout())
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Drop the archive banner once its timeout has passed
    pub fn tick(&mut self, now: Instant) {
        self.notification.clear_expired(now);
    }

    /// Fetch operators and drivers with both requests in flight together
    pub async fn fetch_all(&mut self) -> Result<(), ClientError> {
        let result = tokio::try_join!(self.api.list_operators(), self.api.list_drivers());
        match result {
            Ok((operators, drivers)) => {
                info!(
                    operators = operators.len(),
                    drivers = drivers.len(),
                    "Fetched people"
                );
                self.operators = operators;
                self.drivers = drivers;
                self.paginator.clamp(self.len());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch people");
                Err(e)
            }
        }
    }

    /// Operators followed by drivers
    pub fn combined_list(&self) -> Vec<Person<'_>> {
        self.operators
            .iter()
            .map(Person::Operator)
            .chain(self.drivers.iter().map(Person::Driver))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len() + self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, key: PersonKey) -> Option<Person<'_>> {
        match key.role {
            Role::Operator => self
                .operators
                .iter()
                .find(|o| o.id == key.id)
                .map(Person::Operator),
            Role::Driver => self
                .drivers
                .iter()
                .find(|d| d.id == key.id)
                .map(Person::Driver),
        }
    }

    pub fn open_register(&mut self) {
        self.register_open = true;
    }

    pub fn close_register(&mut self) {
        self.register_open = false;
    }

    pub fn is_register_open(&self) -> bool {
        self.register_open
    }

    /// Post the form to the endpoint matching its mode
    pub async fn handle_form_submit(&mut self) -> bool {
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            self.notification = Notification::error(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            ));
            return false;
        }

        let role = self.form.role();
        let result = match role {
            Role::Driver => self
                .api
                .create_driver(&self.form.driver_payload())
                .await
                .map(|d| d.id),
            Role::Operator => self
                .api
                .create_operator(&self.form.operator_payload())
                .await
                .map(|o| o.id),
        };

        match result {
            Ok(id) => {
                info!(role = %role, id, "Person registered");
                self.notification = Notification::info(format!("{} registered successfully", role));
                self.form.reset();
                self.register_open = false;
                let _ = self.fetch_all().await;
                true
            }
            Err(e) => {
                error!(role = %role, error = %e, "Registration failed");
                self.notification = Notification::error("Failed to register");
                false
            }
        }
    }

    pub fn handle_view(&mut self, key: PersonKey) -> bool {
        if self.find(key).is_none() {
            warn!(role = %key.role, id = key.id, "Cannot view unknown person");
            return false;
        }
        self.selected = Some(key);
        self.view_open = true;
        true
    }

    /// Flags edit mode for the selected record; saving edits is not supported
    pub fn handle_edit(&mut self, key: PersonKey) -> bool {
        if !self.handle_view(key) {
            return false;
        }
        self.editing = true;
        true
    }

    pub fn close_view(&mut self) {
        self.view_open = false;
        self.editing = false;
        self.selected = None;
    }

    pub fn selected(&self) -> Option<Person<'_>> {
        self.selected.and_then(|key| self.find(key))
    }

    pub fn is_view_open(&self) -> bool {
        self.view_open
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// First step of archiving: ask for confirmation
    pub fn handle_archive(&mut self, key: PersonKey) -> bool {
        if self.find(key).is_none() {
            warn!(role = %key.role, id = key.id, "Cannot archive unknown person");
            return false;
        }
        self.pending_archive = Some(key);
        true
    }

    pub fn pending_archive(&self) -> Option<PersonKey> {
        self.pending_archive
    }

    pub fn cancel_archive(&mut self) {
        self.pending_archive = None;
    }

    /// Second step of archiving. Only a 200 response counts as success; on
    /// failure the confirmation stays pending so it can be retried.
    pub async fn confirm_archive(&mut self) -> bool {
        let Some(key) = self.pending_archive else {
            return false;
        };

        let failure = format!("Failed to archive {}", key.role.to_string().to_lowercase());
        match self.api.archive_person(key.role, key.id).await {
            Ok(200) => {
                self.pending_archive = None;
                match key.role {
                    Role::Operator => self.operators.retain(|o| o.id != key.id),
                    Role::Driver => self.drivers.retain(|d| d.id != key.id),
                }
                if self.selected == Some(key) {
                    self.close_view();
                }
                self.paginator.clamp(self.len());
                info!(role = %key.role, id = key.id, "Person archived");
                self.notification = Notification::timed_info(
                    "User archived successfully",
                    self.alert_timeout,
                    Instant::now(),
                );
                true
            }
            Ok(status) => {
                warn!(role = %key.role, id = key.id, status, "Unexpected archive status");
                self.notification = Notification::error(failure);
                false
            }
            Err(e) => {
                error!(role = %key.role, id = key.id, error = %e, "Failed to archive person");
                self.notification = Notification::error(failure);
                false
            }
        }
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages(self.len())
    }

    pub fn go_to_page(&mut self, page: usize) {
        let len = self.len();
        self.paginator.go_to(page, len);
    }

    pub fn next_page(&mut self) {
        let len = self.len();
        self.paginator.next(len);
    }

    pub fn previous_page(&mut self) {
        let len = self.len();
        self.paginator.previous(len);
    }

    pub fn has_next_page(&self) -> bool {
        self.paginator.has_next(self.len())
    }

    pub fn has_previous_page(&self) -> bool {
        self.paginator.has_previous()
    }

    /// Rows of the current page of the merged list
    pub fn current_page_rows(&self) -> Vec<Person<'_>> {
        let all = self.combined_list();
        self.paginator.page_slice(&all).to_vec()
    }
}

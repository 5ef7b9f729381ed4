//! Driver assignment form.
//!
//! Pairs an unassigned driver with an operator's van and lists the
//! assignments that currently have a driver. Drivers are handed in by the
//! caller; assignments are fetched from the server.

use std::collections::HashSet;
use tracing::{error, info, warn};

use super::client::{ClientError, DispatchApi};
use super::notification::Notification;
use crate::db::{AssignDriverRequest, Assignment, Driver, UpdateAssignmentRequest};

pub const MISSING_SELECTION: &str = "Please select an assignment and a driver.";

pub struct AssignDriversForm<A: DispatchApi> {
    api: A,
    drivers: Vec<Driver>,
    /// When set, drivers on archived assignments count as available again
    release_archived_drivers: bool,
    assignments: Vec<Assignment>,
    selected_assignment: Option<i64>,
    selected_driver: Option<i64>,
    editing: bool,
    notification: Notification,
}

impl<A: DispatchApi> AssignDriversForm<A> {
    pub fn new(api: A, drivers: Vec<Driver>, release_archived_drivers: bool) -> Self {
        Self {
            api,
            drivers,
            release_archived_drivers,
            assignments: Vec::new(),
            selected_assignment: None,
            selected_driver: None,
            editing: false,
            notification: Notification::None,
        }
    }

    pub fn set_drivers(&mut self, drivers: Vec<Driver>) {
        self.drivers = drivers;
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn dismiss_notification(&mut self) {
        self.notification.dismiss();
    }

    pub fn selected_assignment(&self) -> Option<i64> {
        self.selected_assignment
    }

    pub fn selected_driver(&self) -> Option<i64> {
        self.selected_driver
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Load every assignment. On failure the previous list is kept.
    pub async fn fetch_assignments(&mut self) -> Result<usize, ClientError> {
        match self.api.list_assignments().await {
            Ok(assignments) => {
                info!(count = assignments.len(), "Fetched assignments");
                self.assignments = assignments;
                Ok(self.assignments.len())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch assignments");
                Err(e)
            }
        }
    }

    /// Drivers that no assignment references
    pub fn available_drivers(&self) -> Vec<&Driver> {
        let taken: HashSet<i64> = self
            .assignments
            .iter()
            .filter(|a| !(self.release_archived_drivers && a.archived))
            .filter_map(|a| a.driver_id)
            .collect();

        self.drivers
            .iter()
            .filter(|d| !taken.contains(&d.id))
            .collect()
    }

    /// Rows of the assignment table: active assignments with a driver
    pub fn assignments_with_drivers(&self) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.has_active_driver())
            .collect()
    }

    /// Dropdown entries for the assignment picker
    pub fn assignment_options(&self) -> Vec<(i64, String)> {
        self.assignments
            .iter()
            .filter(|a| !a.archived)
            .map(|a| (a.id, a.label()))
            .collect()
    }

    pub fn select_assignment(&mut self, id: Option<i64>) {
        self.selected_assignment = id;
    }

    pub fn select_driver(&mut self, id: Option<i64>) {
        self.selected_driver = id;
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing {
            "Update Assignment"
        } else {
            "Assign Driver"
        }
    }

    fn clear_edit_state(&mut self) {
        self.editing = false;
        self.selected_assignment = None;
        self.selected_driver = None;
    }

    /// Submit the selected pairing. Returns whether the server accepted it.
    pub async fn handle_assign_driver(&mut self) -> bool {
        let (assignment_id, driver_id) = match (self.selected_assignment, self.selected_driver) {
            (Some(a), Some(d)) => (a, d),
            _ => {
                self.notification = Notification::error(MISSING_SELECTION);
                return false;
            }
        };

        let req = AssignDriverRequest {
            assignment_id,
            driver_id,
        };
        match self.api.assign_driver(&req).await {
            Ok(_) => {
                info!(assignment_id, driver_id, "Driver assigned");
                self.notification = Notification::info("Driver assigned successfully");
                self.clear_edit_state();
                let _ = self.fetch_assignments().await;
                true
            }
            Err(e) => {
                error!(assignment_id, driver_id, error = %e, "Failed to assign driver");
                let message = e.server_message().unwrap_or("Failed to assign driver");
                self.notification = Notification::error(message);
                false
            }
        }
    }

    /// Load an assignment into the form for changing its driver
    pub fn handle_edit_assignment(&mut self, id: i64) -> bool {
        let Some(assignment) = self.assignments.iter().find(|a| a.id == id) else {
            warn!(assignment_id = id, "Cannot edit unknown assignment");
            return false;
        };

        self.selected_driver = assignment.driver_id;
        self.selected_assignment = Some(assignment.id);
        self.editing = true;
        true
    }

    pub async fn handle_archive_assignment(&mut self, id: i64) -> bool {
        let req = UpdateAssignmentRequest { id, archived: true };
        match self.api.update_assignment(&req).await {
            Ok(_) => {
                info!(assignment_id = id, "Assignment archived");
                self.notification = Notification::info("Assignment archived successfully");
                if self.selected_assignment == Some(id) {
                    self.clear_edit_state();
                }
                let _ = self.fetch_assignments().await;
                true
            }
            Err(e) => {
                error!(assignment_id = id, error = %e, "Failed to archive assignment");
                self.notification = Notification::error("Failed to archive assignment");
                false
            }
        }
    }
}

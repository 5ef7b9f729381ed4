//! In-memory `DispatchApi` used by the console tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

use super::client::{ClientError, DispatchApi, Role};
use crate::db::{
    AssignDriverRequest, Assignment, CreateAssignmentRequest, CreateDriverRequest,
    CreateOperatorRequest, CreateVanRequest, Driver, LicenseDetails, Operator, PersonSummary,
    PersonalDetails, UpdateAssignmentRequest, Van, VanSummary,
};

#[derive(Default)]
pub(crate) struct FakeApi {
    pub assignments: Mutex<Vec<Assignment>>,
    pub operators: Mutex<Vec<Operator>>,
    pub drivers: Mutex<Vec<Driver>>,
    pub calls: Mutex<Vec<String>>,
    /// When set, every mutating call fails with this status and message
    pub failure: Mutex<Option<(u16, Option<String>)>>,
    /// Status reported by a successful archive; 200 unless overridden
    pub archive_status: Mutex<Option<u16>>,
    /// When set, both list endpoints wait here until the other one arrives
    pub list_rendezvous: Mutex<Option<Arc<Barrier>>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_with(&self, status: u16, message: Option<&str>) {
        *self.failure.lock().unwrap() = Some((status, message.map(str::to_string)));
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    async fn rendezvous(&self) {
        let barrier = self.list_rendezvous.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match self.failure.lock().unwrap().clone() {
            Some((status, message)) => Err(ClientError::Api { status, message }),
            None => Ok(()),
        }
    }
}

pub(crate) fn details(firstname: &str, lastname: &str) -> PersonalDetails {
    PersonalDetails {
        firstname: firstname.to_string(),
        middlename: "M".to_string(),
        lastname: lastname.to_string(),
        contact: "09171234567".to_string(),
        region: "NCR".to_string(),
        city: "Pasig".to_string(),
        brgy: "Kapitolyo".to_string(),
        street: "East Capitol Dr".to_string(),
        kind: "regular".to_string(),
        emergency_name: "Contact Person".to_string(),
        emergency_address: "East Capitol Dr, Pasig".to_string(),
        emergency_contact: "09181234567".to_string(),
    }
}

pub(crate) fn operator(id: i64, firstname: &str) -> Operator {
    Operator {
        id,
        details: details(firstname, "Operator"),
        archived: false,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub(crate) fn driver(id: i64, firstname: &str) -> Driver {
    Driver {
        id,
        details: details(firstname, "Driver"),
        license: LicenseDetails {
            license_no: format!("D{:02}-00-000000", id),
            dl_codes: "B".to_string(),
            conditions: "None".to_string(),
            expiration_date: "2030-12-31".to_string(),
        },
        archived: false,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub(crate) fn assignment(id: i64, driver_id: Option<i64>, archived: bool) -> Assignment {
    Assignment {
        id,
        operator_id: id,
        van_id: id,
        operator: PersonSummary {
            id,
            firstname: "Juan".to_string(),
            lastname: "Cruz".to_string(),
        },
        van: VanSummary {
            id,
            plate_number: format!("VAN-{}", id),
        },
        driver_id,
        driver: driver_id.map(|d| PersonSummary {
            id: d,
            firstname: format!("Driver{}", d),
            lastname: "Driver".to_string(),
        }),
        archived,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[async_trait]
impl DispatchApi for FakeApi {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, ClientError> {
        self.record("list_assignments");
        Ok(self.assignments.lock().unwrap().clone())
    }

    async fn create_assignment(
        &self,
        req: &CreateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.record("create_assignment");
        self.check_failure()?;
        let mut assignments = self.assignments.lock().unwrap();
        let created = assignment(assignments.len() as i64 + 1, req.driver_id, false);
        assignments.push(created.clone());
        Ok(created)
    }

    async fn assign_driver(&self, req: &AssignDriverRequest) -> Result<Assignment, ClientError> {
        self.record("assign_driver");
        self.check_failure()?;
        let mut assignments = self.assignments.lock().unwrap();
        let target = assignments
            .iter_mut()
            .find(|a| a.id == req.assignment_id)
            .ok_or(ClientError::Api {
                status: 404,
                message: Some("Assignment not found".to_string()),
            })?;
        *target = Assignment {
            archived: target.archived,
            ..assignment(target.id, Some(req.driver_id), false)
        };
        Ok(target.clone())
    }

    async fn update_assignment(
        &self,
        req: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.record("update_assignment");
        self.check_failure()?;
        let mut assignments = self.assignments.lock().unwrap();
        let target = assignments
            .iter_mut()
            .find(|a| a.id == req.id)
            .ok_or(ClientError::Api {
                status: 404,
                message: Some("Assignment not found".to_string()),
            })?;
        target.archived = req.archived;
        Ok(target.clone())
    }

    async fn list_operators(&self) -> Result<Vec<Operator>, ClientError> {
        self.record("list_operators");
        self.rendezvous().await;
        Ok(self.operators.lock().unwrap().clone())
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, ClientError> {
        self.record("list_drivers");
        self.rendezvous().await;
        Ok(self.drivers.lock().unwrap().clone())
    }

    async fn create_operator(&self, req: &CreateOperatorRequest) -> Result<Operator, ClientError> {
        self.record("create_operator");
        self.check_failure()?;
        let mut operators = self.operators.lock().unwrap();
        let created = Operator {
            details: req.details.clone(),
            ..operator(operators.len() as i64 + 1, "")
        };
        operators.push(created.clone());
        Ok(created)
    }

    async fn create_driver(&self, req: &CreateDriverRequest) -> Result<Driver, ClientError> {
        self.record("create_driver");
        self.check_failure()?;
        let mut drivers = self.drivers.lock().unwrap();
        let created = Driver {
            details: req.details.clone(),
            license: req.license.clone(),
            ..driver(drivers.len() as i64 + 1, "")
        };
        drivers.push(created.clone());
        Ok(created)
    }

    async fn archive_person(&self, role: Role, id: i64) -> Result<u16, ClientError> {
        self.record(&format!("archive_person:{}:{}", role, id));
        self.check_failure()?;
        let status = self.archive_status.lock().unwrap().unwrap_or(200);
        if status == 200 {
            match role {
                Role::Operator => self.operators.lock().unwrap().retain(|o| o.id != id),
                Role::Driver => self.drivers.lock().unwrap().retain(|d| d.id != id),
            }
        }
        Ok(status)
    }

    async fn list_vans(&self) -> Result<Vec<Van>, ClientError> {
        self.record("list_vans");
        Ok(Vec::new())
    }

    async fn create_van(&self, req: &CreateVanRequest) -> Result<Van, ClientError> {
        self.record("create_van");
        self.check_failure()?;
        Ok(Van {
            id: 1,
            plate_number: req.plate_number.clone(),
            created_at: String::new(),
        })
    }
}

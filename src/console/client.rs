//! HTTP client for the dispatch API.
//!
//! Console components talk to the server through the [`DispatchApi`] trait so
//! they can be driven by the real [`HttpDispatchClient`] or by an in-memory
//! implementation in tests.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::db::{
    ArchivePersonRequest, AssignDriverRequest, Assignment, CreateAssignmentRequest,
    CreateDriverRequest, CreateOperatorRequest, CreateVanRequest, Driver, Operator,
    UpdateAssignmentRequest, Van,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or body decoding failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api { status: u16, message: Option<String> },
}

impl ClientError {
    /// The `error` field of the server's JSON error body, when there was one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            ClientError::Transport(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Which kind of person record a row refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Driver,
}

impl Role {
    /// Collection endpoint for this role
    pub fn collection_path(&self) -> &'static str {
        match self {
            Role::Operator => "/api/operators",
            Role::Driver => "/api/drivers",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Role::Operator => "Operator",
            Role::Driver => "Driver",
        })
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "operator" | "operators" => Ok(Role::Operator),
            "driver" | "drivers" => Ok(Role::Driver),
            _ => Err(format!("Unknown role: {} (expected operator or driver)", s)),
        }
    }
}

#[async_trait]
pub trait DispatchApi: Send + Sync {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, ClientError>;

    async fn create_assignment(
        &self,
        req: &CreateAssignmentRequest,
    ) -> Result<Assignment, ClientError>;

    async fn assign_driver(&self, req: &AssignDriverRequest) -> Result<Assignment, ClientError>;

    async fn update_assignment(
        &self,
        req: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError>;

    async fn list_operators(&self) -> Result<Vec<Operator>, ClientError>;

    async fn list_drivers(&self) -> Result<Vec<Driver>, ClientError>;

    async fn create_operator(&self, req: &CreateOperatorRequest) -> Result<Operator, ClientError>;

    async fn create_driver(&self, req: &CreateDriverRequest) -> Result<Driver, ClientError>;

    /// Archive an operator or driver. Returns the HTTP status of the
    /// (successful) response so callers can insist on exactly 200.
    async fn archive_person(&self, role: Role, id: i64) -> Result<u16, ClientError>;

    async fn list_vans(&self) -> Result<Vec<Van>, ClientError>;

    async fn create_van(&self, req: &CreateVanRequest) -> Result<Van, ClientError>;
}

/// Error body as far as the console cares about it
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpDispatchClient {
    http: Client,
    base_url: String,
}

impl HttpDispatchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ClientError> {
        debug!(%method, path, "Dispatch API request");

        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    async fn write<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.send(method, path, Some(body)).await?;
        Ok(response.json().await?)
    }
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|body| body.error)
        .filter(|m| !m.is_empty());
    ClientError::Api { status, message }
}

#[async_trait]
impl DispatchApi for HttpDispatchClient {
    async fn list_assignments(&self) -> Result<Vec<Assignment>, ClientError> {
        self.get("/api/assignments").await
    }

    async fn create_assignment(
        &self,
        req: &CreateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.write(Method::POST, "/api/assignments", req).await
    }

    async fn assign_driver(&self, req: &AssignDriverRequest) -> Result<Assignment, ClientError> {
        self.write(Method::POST, "/api/assignments/assignDriver", req)
            .await
    }

    async fn update_assignment(
        &self,
        req: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.write(Method::PUT, "/api/assignments", req).await
    }

    async fn list_operators(&self) -> Result<Vec<Operator>, ClientError> {
        self.get(Role::Operator.collection_path()).await
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, ClientError> {
        self.get(Role::Driver.collection_path()).await
    }

    async fn create_operator(&self, req: &CreateOperatorRequest) -> Result<Operator, ClientError> {
        self.write(Method::POST, Role::Operator.collection_path(), req)
            .await
    }

    async fn create_driver(&self, req: &CreateDriverRequest) -> Result<Driver, ClientError> {
        self.write(Method::POST, Role::Driver.collection_path(), req)
            .await
    }

    async fn archive_person(&self, role: Role, id: i64) -> Result<u16, ClientError> {
        let body = ArchivePersonRequest { id };
        let response = self
            .send(Method::DELETE, role.collection_path(), Some(&body))
            .await?;
        Ok(response.status().as_u16())
    }

    async fn list_vans(&self) -> Result<Vec<Van>, ClientError> {
        self.get("/api/vans").await
    }

    async fn create_van(&self, req: &CreateVanRequest) -> Result<Van, ClientError> {
        self.write(Method::POST, "/api/vans", req).await
    }
}

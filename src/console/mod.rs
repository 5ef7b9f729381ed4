//! Admin console: client-side state for the dispatch dashboard.
//!
//! Each component owns its state and talks to the server only through a
//! [`DispatchApi`] implementation.

pub mod assign_drivers;
pub mod client;
pub mod notification;
pub mod pagination;
pub mod registry;

#[cfg(test)]
pub(crate) mod fake;

pub use assign_drivers::AssignDriversForm;
pub use client::{ClientError, DispatchApi, HttpDispatchClient, Role};
pub use notification::Notification;
pub use pagination::Paginator;
pub use registry::{FormError, PeopleDirectory, Person, PersonKey, RegistrationForm};

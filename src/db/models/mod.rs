//! Database models split into domain-specific modules.

pub mod assignment;
pub mod driver;
pub mod operator;
pub mod person;
pub mod van;

pub use assignment::*;
pub use driver::*;
pub use operator::*;
pub use person::*;
pub use van::*;

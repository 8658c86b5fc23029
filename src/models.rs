//! Row models mapping directly onto database tables.
//!
//! Models are converted into domain objects before they leave the repository
//! layer.

pub mod customers;
pub mod payments;

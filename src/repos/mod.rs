mod customers;
#[cfg(test)]
pub(crate) mod memory;
mod payments;

pub use customers::{CustomerPersistenceError, CustomerRepo, DynCustomerRepo};
pub use payments::{DynPaymentRepo, PaymentRepo, PostingError};

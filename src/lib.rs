pub mod cli;
pub mod cors;
pub mod customers;
pub mod database;
pub mod http_err;
pub mod models;
pub mod money;
pub mod pagination;
pub mod payments;
pub mod repos;
pub mod server;
pub mod validation;

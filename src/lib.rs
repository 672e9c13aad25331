//! Library exports for ledgergate, shared between the binary and tests.

pub mod alias;
pub mod config;
pub mod navigation;
pub mod proxy;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;

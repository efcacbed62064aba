//! Service layer for customer use-cases.
//!
//! # Responsibility
//! - Own business rules on top of the repository port.
//! - Keep callers independent from the selected storage adapter.

pub mod customer_service;

//! Customer domain model.
//!
//! # Responsibility
//! - Define the data structures shared by adapters and the service.
//!
//! # Invariants
//! - Deletion is permanent; there is no tombstone state.

pub mod customer;

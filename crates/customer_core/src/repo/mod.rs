//! Repository layer abstractions and persistence adapters.
//!
//! # Responsibility
//! - Define the customer storage port consumed by the service.
//! - Provide two interchangeable SQLite adapters and pick one at startup.
//!
//! # Invariants
//! - Both adapters leave the store in the same observable state for the
//!   same sequence of calls.
//! - The service only ever sees `dyn CustomerRepository` or a generic `R`.

pub mod customer_repo;
pub mod entity;
pub mod orm_repo;
pub mod query_repo;

use crate::config::StorageBackend;
use customer_repo::{CustomerRepository, RepoResult};
use log::info;
use orm_repo::OrmCustomerRepository;
use query_repo::SqliteCustomerRepository;
use rusqlite::Connection;

/// Builds the adapter selected by `backend` over a migrated connection.
pub fn open_customer_repository<'conn>(
    backend: StorageBackend,
    conn: &'conn Connection,
) -> RepoResult<Box<dyn CustomerRepository + 'conn>> {
    let repo: Box<dyn CustomerRepository + 'conn> = match backend {
        StorageBackend::Query => Box::new(SqliteCustomerRepository::try_new(conn)?),
        StorageBackend::Orm => Box::new(OrmCustomerRepository::try_new(conn)?),
    };
    info!(
        "event=repo_select module=repo status=ok backend={}",
        backend.as_str()
    );
    Ok(repo)
}

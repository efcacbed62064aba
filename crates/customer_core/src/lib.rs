//! Core domain logic for customer record management.
//! This crate is the single source of truth for customer business rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, StorageBackend};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::customer::{
    Customer, CustomerId, CustomerPatch, CustomerRegistration, CustomerValidationError,
};
pub use repo::customer_repo::{CustomerRepository, CustomerUpdate, RepoError, RepoResult};
pub use repo::entity::{Entity, EntityRepository};
pub use repo::open_customer_repository;
pub use repo::orm_repo::OrmCustomerRepository;
pub use repo::query_repo::SqliteCustomerRepository;
pub use service::customer_service::{
    CustomerService, CustomerServiceError, ErrorKind, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

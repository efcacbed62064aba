//! Customer use-case service.
//!
//! # Responsibility
//! - Enforce email uniqueness, existence checks and no-op detection.
//! - Merge sparse patches into full records before persistence.
//!
//! # Invariants
//! - Service stays storage-agnostic; it only talks to `CustomerRepository`.
//! - Existence and uniqueness checks always run before the write they guard.
//!   Nothing serializes concurrent callers, so two registrations racing on
//!   the same email can both pass the check.
//! - A failed update writes nothing.
//! - Logs carry ids and outcomes only, never names or emails.

use crate::model::customer::{Customer, CustomerId, CustomerPatch, CustomerRegistration};
use crate::repo::customer_repo::{CustomerRepository, CustomerUpdate, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing classification of service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    /// Unclassified storage failure.
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }
}

/// Service error for customer use-cases.
#[derive(Debug)]
pub enum CustomerServiceError {
    /// No customer has this id.
    NotFound(CustomerId),
    /// Email already belongs to a customer.
    DuplicateEmail(String),
    /// Update request would not change any field.
    NoChanges,
    /// Persistence-layer failure, passed through unchanged.
    Repo(RepoError),
}

impl CustomerServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateEmail(_) => ErrorKind::Conflict,
            Self::NoChanges => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for CustomerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "customer with id [{id}] not found"),
            Self::DuplicateEmail(email) => write!(f, "email {email} is already taken"),
            Self::NoChanges => write!(f, "no data changes found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CustomerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CustomerServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, CustomerServiceError>;

/// Customer service facade over one repository implementation.
pub struct CustomerService<R: CustomerRepository> {
    repo: R,
}

impl<R: CustomerRepository> CustomerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every customer.
    pub fn get_all_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.repo.list_customers()?)
    }

    /// Gets one customer or fails with `NotFound`.
    pub fn get_customer(&self, id: CustomerId) -> ServiceResult<Customer> {
        self.repo
            .get_customer(id)?
            .ok_or(CustomerServiceError::NotFound(id))
    }

    /// Registers a new customer and returns its store-assigned id.
    ///
    /// # Errors
    /// - `DuplicateEmail` when the email is already registered; nothing is
    ///   inserted in that case.
    pub fn register_customer(
        &self,
        registration: &CustomerRegistration,
    ) -> ServiceResult<CustomerId> {
        if self.repo.exists_by_email(&registration.email)? {
            warn!("event=customer_register module=service status=error error_code=duplicate_email");
            return Err(CustomerServiceError::DuplicateEmail(
                registration.email.clone(),
            ));
        }

        let id = self.repo.insert_customer(&registration.to_customer())?;
        info!("event=customer_register module=service status=ok customer_id={id}");
        Ok(id)
    }

    /// Permanently deletes a customer.
    ///
    /// # Errors
    /// - `NotFound` when no customer has `id`; the store is not touched.
    pub fn delete_customer(&self, id: CustomerId) -> ServiceResult<()> {
        if !self.repo.exists_by_id(id)? {
            warn!(
                "event=customer_delete module=service status=error customer_id={id} error_code=not_found"
            );
            return Err(CustomerServiceError::NotFound(id));
        }

        self.repo.delete_customer(id)?;
        info!("event=customer_delete module=service status=ok customer_id={id}");
        Ok(())
    }

    /// Applies the dirty fields of `patch` to customer `id`.
    ///
    /// A supplied value equal to the stored one does not count as a change.
    ///
    /// # Errors
    /// - `NotFound` when no customer has `id`.
    /// - `DuplicateEmail` when the new email belongs to another customer.
    /// - `NoChanges` when no supplied field differs from the stored record.
    pub fn update_customer(&self, id: CustomerId, patch: &CustomerPatch) -> ServiceResult<()> {
        let mut customer = self.get_customer(id)?;
        let mut changed = false;

        if let Some(name) = patch.name.as_ref().filter(|name| **name != customer.name) {
            customer.name = name.clone();
            changed = true;
        }

        if let Some(email) = patch.email.as_ref().filter(|email| **email != customer.email) {
            if self.repo.exists_by_email(email)? {
                warn!(
                    "event=customer_update module=service status=error customer_id={id} error_code=duplicate_email"
                );
                return Err(CustomerServiceError::DuplicateEmail(email.clone()));
            }
            customer.email = email.clone();
            changed = true;
        }

        if let Some(age) = patch.age.filter(|age| *age != customer.age) {
            customer.age = age;
            changed = true;
        }

        if !changed {
            warn!(
                "event=customer_update module=service status=error customer_id={id} error_code=no_changes"
            );
            return Err(CustomerServiceError::NoChanges);
        }

        self.repo
            .update_customer(&CustomerUpdate::full(id, &customer))?;
        info!("event=customer_update module=service status=ok customer_id={id}");
        Ok(())
    }
}

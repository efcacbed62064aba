//! Customer domain model.
//!
//! # Responsibility
//! - Define the canonical customer record persisted by every adapter.
//! - Define request shapes for registration and sparse updates.
//!
//! # Invariants
//! - `id` is assigned once by storage and never changes afterwards.
//! - `name` must not be blank.
//! - Email uniqueness is a service rule, not a model rule.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned customer identifier.
pub type CustomerId = i64;

/// Validation errors for customer records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerValidationError {
    /// `name` is empty or whitespace only.
    EmptyName,
}

impl Display for CustomerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "customer name must not be empty"),
        }
    }
}

impl Error for CustomerValidationError {}

/// One registered customer.
///
/// Equality compares all four fields, so a fetched record equals the value
/// that was persisted only once it carries the assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// `None` until the row is inserted.
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl Customer {
    /// Creates a customer that has not been persisted yet.
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Creates a customer carrying an already assigned id.
    ///
    /// Used by row mappers when materializing stored records.
    pub fn with_id(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, email, age)
        }
    }

    /// Validates record invariants before persistence.
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        if self.name.trim().is_empty() {
            return Err(CustomerValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Registration input for a new customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl CustomerRegistration {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Builds the unpersisted customer this registration describes.
    pub fn to_customer(&self) -> Customer {
        Customer::new(self.name.clone(), self.email.clone(), self.age)
    }
}

/// Partial update input.
///
/// `None` means "not supplied". There is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
}

impl CustomerPatch {
    /// Returns whether no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, CustomerPatch, CustomerRegistration, CustomerValidationError};

    #[test]
    fn validate_rejects_blank_name() {
        let customer = Customer::new("   ", "blank@example.com", 30);
        assert_eq!(customer.validate(), Err(CustomerValidationError::EmptyName));
    }

    #[test]
    fn equality_includes_id() {
        let unsaved = Customer::new("Sam", "sam@x.com", 19);
        let saved = Customer::with_id(1, "Sam", "sam@x.com", 19);
        assert_ne!(unsaved, saved);
        assert_eq!(saved, Customer::with_id(1, "Sam", "sam@x.com", 19));
    }

    #[test]
    fn serializes_all_four_fields() {
        let value = serde_json::to_value(Customer::with_id(7, "Ada", "ada@x.com", 36)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 7, "name": "Ada", "email": "ada@x.com", "age": 36})
        );
    }

    #[test]
    fn patch_deserializes_missing_fields_as_none() {
        let patch: CustomerPatch = serde_json::from_str(r#"{"age": 40}"#).unwrap();
        assert_eq!(patch.age, Some(40));
        assert!(patch.name.is_none());
        assert!(patch.email.is_none());
        assert!(!patch.is_empty());
        assert!(CustomerPatch::default().is_empty());
    }

    #[test]
    fn registration_builds_unpersisted_customer() {
        let customer = CustomerRegistration::new("Sam", "sam@x.com", 19).to_customer();
        assert!(customer.id.is_none());
        assert_eq!(customer.email, "sam@x.com");
    }
}

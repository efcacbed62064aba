//! Customer adapter over the generic entity repository.
//!
//! # Responsibility
//! - Implement `CustomerRepository` by delegating to `EntityRepository`.
//! - Map `Customer` onto the `customer` table declaratively.
//!
//! # Invariants
//! - `update_customer` always saves a complete entity: the stored row with
//!   the supplied fields overlaid. A missing row is left missing.

use super::customer_repo::{
    ensure_customer_schema, CustomerRepository, CustomerUpdate, RepoError, RepoResult,
    CUSTOMER_TABLE,
};
use super::entity::{Entity, EntityRepository};
use crate::model::customer::{Customer, CustomerId};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

impl Entity for Customer {
    const TABLE: &'static str = CUSTOMER_TABLE;
    const PRIMARY_KEY: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["name", "email", "age"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Integer(i64::from(self.age)),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let age: i64 = row.get("age")?;
        let customer = Customer {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            email: row.get("email")?,
            age: i32::try_from(age).map_err(|_| {
                RepoError::InvalidData(format!("age value `{age}` out of range in customer.age"))
            })?,
        };
        customer.validate()?;
        Ok(customer)
    }
}

/// Customer repository backed by the entity mapper.
pub struct OrmCustomerRepository<'conn> {
    entities: EntityRepository<'conn, Customer>,
}

impl<'conn> OrmCustomerRepository<'conn> {
    /// Wraps a connection that has already been migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_customer_schema(conn)?;
        Ok(Self {
            entities: EntityRepository::new(conn),
        })
    }
}

impl CustomerRepository for OrmCustomerRepository<'_> {
    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.entities.find_all()
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        self.entities.find_by_id(id)
    }

    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        customer.validate()?;
        let fresh = Customer {
            id: None,
            ..customer.clone()
        };
        self.entities.save(&fresh)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        self.entities.exists_by("email", email)
    }

    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool> {
        self.entities.exists_by_id(id)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        self.entities.delete_by_id(id)
    }

    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()> {
        update.validate()?;

        let Some(mut customer) = self.entities.find_by_id(update.id)? else {
            return Ok(());
        };
        update.apply_to(&mut customer);
        self.entities.save(&customer)?;
        Ok(())
    }
}

//! Customer storage port and shared SQLite helpers.
//!
//! # Responsibility
//! - Define the persistence contract consumed by `CustomerService`.
//! - Share row mapping and schema checks between adapters.
//!
//! # Invariants
//! - Adapters report existence only; uniqueness is enforced by the service.
//! - `update_customer` is a sparse patch: `None` fields are never written.
//! - Write paths must call `Customer::validate()` (or the update equivalent)
//!   before SQL mutations; read paths reject invalid persisted rows.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::customer::{Customer, CustomerId, CustomerValidationError};
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const CUSTOMER_TABLE: &str = "customer";
pub(crate) const CUSTOMER_COLUMNS: &[&str] = &["id", "name", "email", "age"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every customer adapter.
#[derive(Debug)]
pub enum RepoError {
    Validation(CustomerValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    UnknownColumn {
        table: &'static str,
        column: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted customer data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "column `{column}` is not mapped on `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CustomerValidationError> for RepoError {
    fn from(value: CustomerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sparse write handed to `CustomerRepository::update_customer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub id: CustomerId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl CustomerUpdate {
    /// Update that rewrites every column from `customer`.
    pub fn full(id: CustomerId, customer: &Customer) -> Self {
        Self {
            id,
            name: Some(customer.name.clone()),
            email: Some(customer.email.clone()),
            age: Some(customer.age),
        }
    }

    /// Overlays supplied fields onto `customer`, leaving the rest untouched.
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(age) = self.age {
            customer.age = age;
        }
    }

    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(CustomerValidationError::EmptyName),
            _ => Ok(()),
        }
    }
}

/// Persistence contract for customer records.
///
/// Every call is its own unit of work; nothing spans calls.
pub trait CustomerRepository {
    /// Lists every stored customer ordered by id.
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    /// Returns `None` when no row has `id`.
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Inserts `customer`, ignoring its `id`, and returns the assigned id.
    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId>;
    fn exists_by_email(&self, email: &str) -> RepoResult<bool>;
    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool>;
    /// Deletes the row; missing ids are not an error.
    fn delete_customer(&self, id: CustomerId) -> RepoResult<()>;
    /// Writes each supplied field of `update` to row `update.id`.
    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()>;
}

impl<R: CustomerRepository + ?Sized> CustomerRepository for &R {
    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        (**self).list_customers()
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        (**self).get_customer(id)
    }

    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        (**self).insert_customer(customer)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        (**self).exists_by_email(email)
    }

    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool> {
        (**self).exists_by_id(id)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        (**self).delete_customer(id)
    }

    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()> {
        (**self).update_customer(update)
    }
}

impl<R: CustomerRepository + ?Sized> CustomerRepository for Box<R> {
    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        (**self).list_customers()
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        (**self).get_customer(id)
    }

    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        (**self).insert_customer(customer)
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        (**self).exists_by_email(email)
    }

    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool> {
        (**self).exists_by_id(id)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        (**self).delete_customer(id)
    }

    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()> {
        (**self).update_customer(update)
    }
}

/// Verifies that `conn` went through migrations and carries the customer table.
pub(crate) fn ensure_customer_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    if actual_version > expected_version {
        return Err(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: expected_version,
        }));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([CUSTOMER_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(CUSTOMER_TABLE));
    }
    if let Some(&column) = CUSTOMER_COLUMNS
        .iter()
        .find(|required| !columns.iter().any(|column| column.as_str() == **required))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: CUSTOMER_TABLE,
            column,
        });
    }

    Ok(())
}

/// Maps one `customer` row by column name.
pub(crate) fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let age: i64 = row.get("age")?;
    let age = i32::try_from(age).map_err(|_| {
        RepoError::InvalidData(format!("age value `{age}` out of range in customer.age"))
    })?;

    let customer = Customer {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        age,
    };
    customer.validate()?;
    Ok(customer)
}

//! Customer adapter over hand-written parameterized statements.
//!
//! # Responsibility
//! - Implement `CustomerRepository` with one SQL statement per operation.
//!
//! # Invariants
//! - `update_customer` issues one single-column statement per supplied field
//!   and no enclosing transaction.

use super::customer_repo::{
    ensure_customer_schema, parse_customer_row, CustomerRepository, CustomerUpdate, RepoResult,
};
use crate::model::customer::{Customer, CustomerId};
use rusqlite::{params, Connection};

const CUSTOMER_SELECT_SQL: &str = "SELECT id, name, email, age FROM customer";

/// SQLite-backed customer repository using raw queries.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Wraps a connection that has already been migrated.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_customer_schema(conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, param: impl rusqlite::ToSql) -> RepoResult<i64> {
        let count = self.conn.query_row(sql, [param], |row| row.get(0))?;
        Ok(count)
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();

        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }

        Ok(customers)
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn insert_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        customer.validate()?;

        self.conn.execute(
            "INSERT INTO customer (name, email, age) VALUES (?1, ?2, ?3);",
            params![customer.name.as_str(), customer.email.as_str(), customer.age],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let count = self.count("SELECT count(id) FROM customer WHERE email = ?1;", email)?;
        Ok(count > 0)
    }

    fn exists_by_id(&self, id: CustomerId) -> RepoResult<bool> {
        let count = self.count("SELECT count(id) FROM customer WHERE id = ?1;", id)?;
        Ok(count > 0)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM customer WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn update_customer(&self, update: &CustomerUpdate) -> RepoResult<()> {
        update.validate()?;

        if let Some(name) = &update.name {
            self.conn.execute(
                "UPDATE customer SET name = ?1 WHERE id = ?2;",
                params![name.as_str(), update.id],
            )?;
        }

        if let Some(email) = &update.email {
            self.conn.execute(
                "UPDATE customer SET email = ?1 WHERE id = ?2;",
                params![email.as_str(), update.id],
            )?;
        }

        if let Some(age) = update.age {
            self.conn.execute(
                "UPDATE customer SET age = ?1 WHERE id = ?2;",
                params![age, update.id],
            )?;
        }

        Ok(())
    }
}

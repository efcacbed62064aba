//! Generic entity mapping over SQLite tables.
//!
//! # Responsibility
//! - Let a type declare its table, key and columns once.
//! - Provide find/save/delete/exists operations without per-type SQL.
//!
//! # Invariants
//! - Column names are only ever taken from `Entity` constants, never from
//!   caller input; `exists_by` rejects undeclared columns.
//! - `save` inserts when the key is unset and upserts by key otherwise.

use super::customer_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::marker::PhantomData;

/// A record type mapped onto one table with an integer primary key.
pub trait Entity: Sized {
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;
    /// Non-key columns, in the order `values` yields them.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<i64>;
    fn values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Table-agnostic repository for any `Entity`.
pub struct EntityRepository<'conn, E: Entity> {
    conn: &'conn Connection,
    _entity: PhantomData<E>,
}

impl<'conn, E: Entity> EntityRepository<'conn, E> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// Returns every row ordered by primary key.
    pub fn find_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", select_sql::<E>(), E::PRIMARY_KEY);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }

        Ok(entities)
    }

    pub fn find_by_id(&self, id: i64) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?1;", select_sql::<E>(), E::PRIMARY_KEY);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Persists `entity` and returns its key.
    ///
    /// Without a key the row is inserted and the store assigns one; with a
    /// key every column of that row is overwritten, inserting it if absent.
    pub fn save(&self, entity: &E) -> RepoResult<i64> {
        match entity.id() {
            None => {
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({});",
                    E::TABLE,
                    E::COLUMNS.join(", "),
                    placeholders(E::COLUMNS.len())
                );
                self.conn.execute(&sql, params_from_iter(entity.values()))?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let assignments = E::COLUMNS
                    .iter()
                    .map(|column| format!("{column} = excluded.{column}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "INSERT INTO {table} ({key}, {columns}) VALUES ({values})
                     ON CONFLICT({key}) DO UPDATE SET {assignments};",
                    table = E::TABLE,
                    key = E::PRIMARY_KEY,
                    columns = E::COLUMNS.join(", "),
                    values = placeholders(E::COLUMNS.len() + 1),
                );
                let mut values = Vec::with_capacity(E::COLUMNS.len() + 1);
                values.push(Value::Integer(id));
                values.extend(entity.values());
                self.conn.execute(&sql, params_from_iter(values))?;
                Ok(id)
            }
        }
    }

    pub fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1;", E::TABLE, E::PRIMARY_KEY);
        self.conn.execute(&sql, [id])?;
        Ok(())
    }

    pub fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        self.exists_by(E::PRIMARY_KEY, id)
    }

    /// Returns whether any row has `column = value`.
    pub fn exists_by(&self, column: &str, value: impl ToSql) -> RepoResult<bool> {
        let column = declared_column::<E>(column)?;
        let sql = format!(
            "SELECT 1 FROM {} WHERE {column} = ?1 LIMIT 1;",
            E::TABLE
        );
        let found = self
            .conn
            .query_row(&sql, [value], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(found.is_some())
    }
}

fn select_sql<E: Entity>() -> String {
    format!(
        "SELECT {}, {} FROM {}",
        E::PRIMARY_KEY,
        E::COLUMNS.join(", "),
        E::TABLE
    )
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn declared_column<E: Entity>(column: &str) -> RepoResult<&'static str> {
    std::iter::once(E::PRIMARY_KEY)
        .chain(E::COLUMNS.iter().copied())
        .find(|declared| *declared == column)
        .ok_or_else(|| RepoError::UnknownColumn {
            table: E::TABLE,
            column: column.to_string(),
        })
}

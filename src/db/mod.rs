//! SQLite persistence, split across logical submodules. Each collection lives
//! in its own table and is rewritten wholesale on every save.

mod books;
mod connection;
mod loans;

use std::path::Path;

use anyhow::Result;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::{Book, BookId, Loan};
use crate::storage::Storage;

pub use books::{fetch_books, replace_books};
pub use connection::{ensure_schema, open_database, open_in_memory};
pub use loans::{fetch_loans, replace_loans};

/// [`Storage`] backed by an embedded SQLite database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Storage for SqliteStorage {
    fn load_books(&self) -> Result<Vec<Book>> {
        fetch_books(&self.conn)
    }

    fn save_books(&mut self, books: &[Book]) -> Result<()> {
        replace_books(&mut self.conn, books)
    }

    fn load_loans(&self) -> Result<Vec<Loan>> {
        fetch_loans(&self.conn)
    }

    fn save_loans(&mut self, loans: &[Loan]) -> Result<()> {
        replace_loans(&mut self.conn, loans)
    }
}

impl ToSql for BookId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.as_uuid().to_sql()
    }
}

impl FromSql for BookId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Uuid::column_result(value).map(BookId::from)
    }
}

//! Persistence gateway consumed by [`crate::Library`]. Each collection is a
//! full snapshot: loading returns everything, saving replaces everything.

use anyhow::Result;

use crate::models::{Book, Loan};

pub trait Storage {
    fn load_books(&self) -> Result<Vec<Book>>;
    fn save_books(&mut self, books: &[Book]) -> Result<()>;
    fn load_loans(&self) -> Result<Vec<Loan>>;
    fn save_loans(&mut self, loans: &[Loan]) -> Result<()>;
}

/// Process-local storage that forgets everything on exit. Handy for tests and
/// for trying the tracker without touching the on-disk database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    books: Vec<Book>,
    loans: Vec<Loan>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_books(&self) -> Result<Vec<Book>> {
        Ok(self.books.clone())
    }

    fn save_books(&mut self, books: &[Book]) -> Result<()> {
        self.books = books.to_vec();
        Ok(())
    }

    fn load_loans(&self) -> Result<Vec<Loan>> {
        Ok(self.loans.clone())
    }

    fn save_loans(&mut self, loans: &[Loan]) -> Result<()> {
        self.loans = loans.to_vec();
        Ok(())
    }
}

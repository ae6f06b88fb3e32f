use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, BookId};

use super::availability::is_loaned;
use super::catalog::BookStore;
use super::ledger::LoanLedger;

/// Checks catalog mutations against the ledger before they are applied.
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyGuard<'a> {
    loans: &'a LoanLedger,
}

impl<'a> ConsistencyGuard<'a> {
    pub fn new(loans: &'a LoanLedger) -> Self {
        Self { loans }
    }

    /// A book may be deleted only while nobody is borrowing it.
    pub fn can_delete(&self, book_id: BookId) -> bool {
        !is_loaned(self.loans, book_id)
    }

    /// Editing is allowed even for loaned books; only deletion is blocked.
    pub fn can_edit(&self, _book_id: BookId) -> bool {
        true
    }

    /// Remove a book unless it is on loan. A refused request leaves the
    /// catalog untouched; an unknown id yields `Ok(None)`.
    pub fn request_delete(
        &self,
        books: &mut BookStore,
        book_id: BookId,
    ) -> LibraryResult<Option<Book>> {
        if !self.can_delete(book_id) {
            return Err(LibraryError::BookOnLoan(book_id));
        }
        Ok(books.remove(book_id))
    }
}

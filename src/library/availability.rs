use crate::models::{Book, BookId};

use super::catalog::BookStore;
use super::ledger::LoanLedger;

/// `true` when the ledger holds a loan for the book.
pub fn is_loaned(loans: &LoanLedger, book_id: BookId) -> bool {
    loans.active_loan_for(book_id).is_some()
}

/// Read-only join of the catalog against the ledger. Every call recomputes
/// from the borrowed state, so there is no second copy to go stale.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityResolver<'a> {
    books: &'a BookStore,
    loans: &'a LoanLedger,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(books: &'a BookStore, loans: &'a LoanLedger) -> Self {
        Self { books, loans }
    }

    pub fn is_loaned(&self, book_id: BookId) -> bool {
        is_loaned(self.loans, book_id)
    }

    /// Books nobody is currently borrowing, in catalog order.
    pub fn available_books(&self) -> Vec<&'a Book> {
        self.partition(false)
    }

    /// Books out on loan, in catalog order.
    pub fn loaned_books(&self) -> Vec<&'a Book> {
        self.partition(true)
    }

    fn partition(&self, loaned: bool) -> Vec<&'a Book> {
        let loans = self.loans;
        self.books
            .all()
            .iter()
            .filter(|book| is_loaned(loans, book.id) == loaned)
            .collect()
    }
}

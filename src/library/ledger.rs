use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Local};
use tracing::warn;

use crate::error::{LibraryError, LibraryResult};
use crate::models::{BookId, Loan};

use super::identity::IdentityResolver;
use super::schedule::compute_due_date;

/// Loan periods accepted by [`LoanLedger::create`], in weeks.
pub const LOAN_WEEKS: RangeInclusive<u32> = 1..=4;

/// Active loans in creation order. A book appears in at most one loan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanLedger {
    loans: Vec<Loan>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from persisted records, keeping only the first loan
    /// seen for any book.
    pub fn from_loans(loans: Vec<Loan>) -> Self {
        let mut seen = HashSet::new();
        let loans = loans
            .into_iter()
            .filter(|loan| {
                let fresh = seen.insert(loan.book_id);
                if !fresh {
                    warn!(book = %loan.book_id, "dropping duplicate stored loan");
                }
                fresh
            })
            .collect();
        Self { loans }
    }

    /// Lend a book starting now.
    pub fn create(
        &mut self,
        books: &impl IdentityResolver,
        book_id: BookId,
        borrower_name: &str,
        duration_weeks: u32,
    ) -> LibraryResult<Loan> {
        self.create_at(books, book_id, borrower_name, duration_weeks, Local::now())
    }

    /// Lend a book from an explicit start time. Every check runs before the
    /// ledger is touched.
    pub fn create_at(
        &mut self,
        books: &impl IdentityResolver,
        book_id: BookId,
        borrower_name: &str,
        duration_weeks: u32,
        started_at: DateTime<Local>,
    ) -> LibraryResult<Loan> {
        if !books.contains(book_id) {
            return Err(LibraryError::InvalidReference(book_id));
        }
        if self.active_loan_for(book_id).is_some() {
            return Err(LibraryError::AlreadyLoaned(book_id));
        }
        if !LOAN_WEEKS.contains(&duration_weeks) {
            return Err(LibraryError::InvalidDuration(duration_weeks));
        }
        let borrower_name = borrower_name.trim();
        if borrower_name.is_empty() {
            return Err(LibraryError::BlankBorrower);
        }
        let due_at = compute_due_date(&started_at, duration_weeks)
            .ok_or(LibraryError::InvalidDuration(duration_weeks))?;

        let loan = Loan {
            book_id,
            borrower_name: borrower_name.to_string(),
            duration_weeks,
            started_at,
            due_at,
        };
        self.loans.push(loan.clone());
        Ok(loan)
    }

    pub fn active_loan_for(&self, book_id: BookId) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.book_id == book_id)
    }

    /// End the loan on a book, if it has one.
    pub fn release(&mut self, book_id: BookId) -> Option<Loan> {
        let index = self.loans.iter().position(|loan| loan.book_id == book_id)?;
        Some(self.loans.remove(index))
    }

    pub fn all(&self) -> &[Loan] {
        &self.loans
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::library::BookStore;
    use crate::models::BookDraft;

    fn store_with(titles: &[&str]) -> (BookStore, Vec<BookId>) {
        let mut store = BookStore::new();
        let ids = titles
            .iter()
            .map(|title| {
                store
                    .add(BookDraft {
                        title: title.to_string(),
                        author: "Tove Jansson".to_string(),
                        ..BookDraft::default()
                    })
                    .id
            })
            .collect();
        (store, ids)
    }

    fn new_year() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_stores_the_computed_due_date() {
        let (store, ids) = store_with(&["Comet in Moominland"]);
        let mut ledger = LoanLedger::new();

        let loan = ledger
            .create_at(&store, ids[0], "  Snufkin ", 2, new_year())
            .unwrap();

        assert_eq!(loan.borrower_name, "Snufkin");
        assert_eq!(loan.due_at, Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(ledger.all(), &[loan]);
    }

    #[test]
    fn create_rejects_unknown_books() {
        let (store, _) = store_with(&["Finn Family Moomintroll"]);
        let mut ledger = LoanLedger::new();
        let ghost = BookId::generate();

        let err = ledger.create(&store, ghost, "Little My", 1).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidReference(id) if id == ghost));
        assert!(ledger.is_empty());
    }

    #[test]
    fn create_rejects_a_second_loan_for_the_same_book() {
        let (store, ids) = store_with(&["Moominsummer Madness"]);
        let mut ledger = LoanLedger::new();
        ledger.create(&store, ids[0], "Sniff", 1).unwrap();

        let err = ledger.create(&store, ids[0], "Snork", 3).unwrap_err();
        assert!(matches!(err, LibraryError::AlreadyLoaned(_)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.all()[0].borrower_name, "Sniff");
    }

    #[test]
    fn create_enforces_the_loan_period() {
        let (store, ids) = store_with(&["Moominland Midwinter"]);
        let mut ledger = LoanLedger::new();

        for weeks in [0, 5, 52] {
            let err = ledger.create(&store, ids[0], "Too-ticky", weeks).unwrap_err();
            assert!(matches!(err, LibraryError::InvalidDuration(w) if w == weeks));
        }
        for weeks in LOAN_WEEKS {
            let mut fresh = LoanLedger::new();
            assert!(fresh.create(&store, ids[0], "Too-ticky", weeks).is_ok());
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn create_requires_a_borrower() {
        let (store, ids) = store_with(&["Moominpappa at Sea"]);
        let mut ledger = LoanLedger::new();

        let err = ledger.create(&store, ids[0], "   ", 1).unwrap_err();
        assert!(matches!(err, LibraryError::BlankBorrower));
        assert!(ledger.is_empty());
    }

    #[test]
    fn all_preserves_creation_order() {
        let (store, ids) = store_with(&["One", "Two", "Three"]);
        let mut ledger = LoanLedger::new();
        ledger.create(&store, ids[2], "C", 1).unwrap();
        ledger.create(&store, ids[0], "A", 1).unwrap();
        ledger.create(&store, ids[1], "B", 1).unwrap();

        let borrowers: Vec<_> = ledger.all().iter().map(|l| l.borrower_name.as_str()).collect();
        assert_eq!(borrowers, ["C", "A", "B"]);
    }

    #[test]
    fn release_frees_the_book_for_another_loan() {
        let (store, ids) = store_with(&["Moominvalley in November"]);
        let mut ledger = LoanLedger::new();
        ledger.create(&store, ids[0], "Fillyjonk", 1).unwrap();

        let returned = ledger.release(ids[0]).unwrap();
        assert_eq!(returned.borrower_name, "Fillyjonk");
        assert!(ledger.active_loan_for(ids[0]).is_none());
        assert!(ledger.release(ids[0]).is_none());
        assert!(ledger.create(&store, ids[0], "Hemulen", 2).is_ok());
    }

    #[test]
    fn from_loans_drops_duplicates() {
        let (store, ids) = store_with(&["Tales from Moominvalley"]);
        let mut ledger = LoanLedger::new();
        let loan = ledger.create(&store, ids[0], "Mymble", 1).unwrap();
        let mut duplicate = loan.clone();
        duplicate.borrower_name = "Whomper".to_string();

        let restored = LoanLedger::from_loans(vec![loan.clone(), duplicate]);
        assert_eq!(restored.all(), &[loan]);
    }
}

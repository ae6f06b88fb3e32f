//! Catalog and loan rules, plus the [`Library`] facade the front-end talks to.
//!
//! The facade owns one [`BookStore`], one [`LoanLedger`], the open edit
//! session and a [`Storage`] gateway. Every intent goes through it so guard
//! checks run before anything changes, and every successful change is written
//! through to storage before it becomes visible in memory.

mod availability;
mod catalog;
mod guard;
mod identity;
mod ledger;
mod publishers;
mod schedule;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

pub use availability::AvailabilityResolver;
pub use catalog::BookStore;
pub use guard::ConsistencyGuard;
pub use identity::IdentityResolver;
pub use ledger::{LoanLedger, LOAN_WEEKS};
pub use publishers::{publisher_options, PublisherFilter};
pub use schedule::compute_due_date;

use crate::error::{Collection, LibraryError, LibraryResult};
use crate::models::{Book, BookDraft, BookId, Loan};
use crate::storage::Storage;

pub struct Library<S: Storage> {
    storage: S,
    books: BookStore,
    loans: LoanLedger,
    editing: Option<BookId>,
}

impl<S: Storage> Library<S> {
    /// Read both collections once and build the in-memory model from them.
    pub fn load(storage: S) -> Result<Self> {
        let books = BookStore::from_books(storage.load_books().context("failed to load books")?);
        let loans = LoanLedger::from_loans(storage.load_loans().context("failed to load loans")?);

        let dangling = loans
            .all()
            .iter()
            .filter(|loan| !books.contains(loan.book_id))
            .count();
        if dangling > 0 {
            warn!(dangling, "stored loans reference books missing from the catalog");
        }

        info!(books = books.len(), loans = loans.len(), "library loaded");
        Ok(Self {
            storage,
            books,
            loans,
            editing: None,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn books(&self) -> &[Book] {
        self.books.all()
    }

    pub fn loans(&self) -> &[Loan] {
        self.loans.all()
    }

    pub fn resolve(&self, id: BookId) -> Option<&Book> {
        self.books.resolve(id)
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.books.selected_book()
    }

    pub fn active_loan_for(&self, id: BookId) -> Option<&Loan> {
        self.loans.active_loan_for(id)
    }

    pub fn availability(&self) -> AvailabilityResolver<'_> {
        AvailabilityResolver::new(&self.books, &self.loans)
    }

    pub fn is_loaned(&self, id: BookId) -> bool {
        self.availability().is_loaned(id)
    }

    pub fn available_books(&self) -> Vec<&Book> {
        self.availability().available_books()
    }

    pub fn loaned_books(&self) -> Vec<&Book> {
        self.availability().loaned_books()
    }

    pub fn can_delete(&self, id: BookId) -> bool {
        ConsistencyGuard::new(&self.loans).can_delete(id)
    }

    pub fn can_edit(&self, id: BookId) -> bool {
        ConsistencyGuard::new(&self.loans).can_edit(id)
    }

    pub fn publisher_options(&self) -> Vec<PublisherFilter> {
        publisher_options(self.books.all())
    }

    /// Catalog order, restricted to the filter. Never changes the catalog.
    pub fn filtered_books(&self, filter: &PublisherFilter) -> Vec<&Book> {
        self.books
            .all()
            .iter()
            .filter(|book| filter.matches(book))
            .collect()
    }

    /// The book whose edit session is open, if any.
    pub fn editing(&self) -> Option<&Book> {
        self.editing.and_then(|id| self.books.resolve(id))
    }

    pub fn add_book(&mut self, draft: BookDraft) -> LibraryResult<Book> {
        let mut staged = self.books.clone();
        let book = staged.add(draft).clone();
        self.commit_books(staged)?;
        info!(book = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    pub fn toggle_select(&mut self, id: BookId) -> LibraryResult<()> {
        let mut staged = self.books.clone();
        if staged.toggle_select(id) {
            self.commit_books(staged)?;
        }
        Ok(())
    }

    /// Open an edit session on the selected book.
    pub fn begin_edit(&mut self) -> LibraryResult<&Book> {
        let book = self.books.selected_book().ok_or(LibraryError::NoSelection)?;
        self.editing = Some(book.id);
        Ok(book)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply the draft to the book under edit and close the session. Returns
    /// `Ok(false)` without changing anything when no session is open or its
    /// book has disappeared.
    pub fn commit_edit(&mut self, draft: BookDraft) -> LibraryResult<bool> {
        let Some(id) = self.editing else {
            debug!("edit committed without an open session");
            return Ok(false);
        };
        let mut staged = self.books.clone();
        if !staged.update(id, draft) {
            self.editing = None;
            return Ok(false);
        }
        self.commit_books(staged)?;
        self.editing = None;
        info!(book = %id, "book updated");
        Ok(true)
    }

    /// Delete whichever book is selected.
    pub fn delete_selected(&mut self) -> LibraryResult<Book> {
        let id = self
            .books
            .selected_book()
            .map(|book| book.id)
            .ok_or(LibraryError::NoSelection)?;
        self.request_delete(id)?
            .ok_or(LibraryError::InvalidReference(id))
    }

    /// Delete a book unless it is on loan. `Ok(None)` for unknown ids.
    pub fn request_delete(&mut self, id: BookId) -> LibraryResult<Option<Book>> {
        let mut staged = self.books.clone();
        let removed = ConsistencyGuard::new(&self.loans)
            .request_delete(&mut staged, id)
            .inspect_err(|err| warn!(book = %id, %err, "delete refused"))?;
        let Some(book) = removed else {
            return Ok(None);
        };
        self.commit_books(staged)?;
        if self.editing == Some(id) {
            self.editing = None;
        }
        info!(book = %id, title = %book.title, "book deleted");
        Ok(Some(book))
    }

    pub fn create_loan(
        &mut self,
        book_id: BookId,
        borrower_name: &str,
        duration_weeks: u32,
    ) -> LibraryResult<Loan> {
        self.create_loan_at(book_id, borrower_name, duration_weeks, Local::now())
    }

    pub fn create_loan_at(
        &mut self,
        book_id: BookId,
        borrower_name: &str,
        duration_weeks: u32,
        started_at: DateTime<Local>,
    ) -> LibraryResult<Loan> {
        let mut staged = self.loans.clone();
        let loan = staged
            .create_at(&self.books, book_id, borrower_name, duration_weeks, started_at)
            .inspect_err(|err| warn!(book = %book_id, %err, "loan refused"))?;
        self.commit_loans(staged)?;
        info!(
            book = %book_id,
            borrower = %loan.borrower_name,
            due = %loan.due_at.format("%Y-%m-%d"),
            "loan created"
        );
        Ok(loan)
    }

    /// Close the loan on a book. `Ok(None)` if it was not on loan.
    pub fn return_loan(&mut self, book_id: BookId) -> LibraryResult<Option<Loan>> {
        let mut staged = self.loans.clone();
        let Some(loan) = staged.release(book_id) else {
            return Ok(None);
        };
        self.commit_loans(staged)?;
        info!(book = %book_id, borrower = %loan.borrower_name, "loan returned");
        Ok(Some(loan))
    }

    fn commit_books(&mut self, staged: BookStore) -> LibraryResult<()> {
        self.storage
            .save_books(staged.all())
            .map_err(|source| persistence_error(Collection::Books, source))?;
        debug!(books = staged.len(), "books saved");
        self.books = staged;
        Ok(())
    }

    fn commit_loans(&mut self, staged: LoanLedger) -> LibraryResult<()> {
        self.storage
            .save_loans(staged.all())
            .map_err(|source| persistence_error(Collection::Loans, source))?;
        debug!(loans = staged.len(), "loans saved");
        self.loans = staged;
        Ok(())
    }
}

fn persistence_error(collection: Collection, source: anyhow::Error) -> LibraryError {
    error!(%collection, error = %source, "persistence write failed");
    LibraryError::Persistence { collection, source }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::storage::MemoryStorage;

    /// Storage whose writes fail on demand.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: bool,
    }

    impl Storage for FlakyStorage {
        fn load_books(&self) -> Result<Vec<Book>> {
            self.inner.load_books()
        }

        fn save_books(&mut self, books: &[Book]) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("disk full"));
            }
            self.inner.save_books(books)
        }

        fn load_loans(&self) -> Result<Vec<Loan>> {
            self.inner.load_loans()
        }

        fn save_loans(&mut self, loans: &[Loan]) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("disk full"));
            }
            self.inner.save_loans(loans)
        }
    }

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Italo Calvino".to_string(),
            publisher: Some("Einaudi".to_string()),
            ..BookDraft::default()
        }
    }

    fn library() -> Library<MemoryStorage> {
        Library::load(MemoryStorage::new()).unwrap()
    }

    #[test]
    fn mutations_are_written_through() {
        let mut library = library();
        let book = library.add_book(draft("Invisible Cities")).unwrap();
        library.create_loan(book.id, "Marco", 2).unwrap();

        let storage = library.storage();
        assert_eq!(storage.load_books().unwrap(), library.books());
        assert_eq!(storage.load_loans().unwrap(), library.loans());
    }

    #[test]
    fn begin_edit_requires_a_selection() {
        let mut library = library();
        library.add_book(draft("Cosmicomics")).unwrap();

        assert!(matches!(library.begin_edit(), Err(LibraryError::NoSelection)));
        assert!(matches!(library.delete_selected(), Err(LibraryError::NoSelection)));
    }

    #[test]
    fn edit_session_updates_the_selected_book() {
        let mut library = library();
        let book = library.add_book(draft("If on a winter's night")).unwrap();
        library.toggle_select(book.id).unwrap();

        assert_eq!(library.begin_edit().unwrap().id, book.id);
        assert!(library.commit_edit(draft("If on a winter's night a traveler")).unwrap());

        let updated = library.resolve(book.id).unwrap();
        assert_eq!(updated.title, "If on a winter's night a traveler");
        assert!(!updated.selected);
        assert!(library.editing().is_none());
    }

    #[test]
    fn commit_without_session_is_silent() {
        let mut library = library();
        let book = library.add_book(draft("Mr. Palomar")).unwrap();

        assert!(!library.commit_edit(draft("Changed")).unwrap());
        assert_eq!(library.resolve(book.id).unwrap().title, "Mr. Palomar");
    }

    #[test]
    fn cancel_edit_discards_the_session() {
        let mut library = library();
        let book = library.add_book(draft("The Baron in the Trees")).unwrap();
        library.toggle_select(book.id).unwrap();
        library.begin_edit().unwrap();
        library.cancel_edit();

        assert!(!library.commit_edit(draft("Changed")).unwrap());
        assert!(library.selected_book().is_some());
    }

    #[test]
    fn loaned_books_stay_editable() {
        let mut library = library();
        let book = library.add_book(draft("The Cloven Viscount")).unwrap();
        library.create_loan(book.id, "Medardo", 1).unwrap();
        library.toggle_select(book.id).unwrap();

        assert!(library.can_edit(book.id));
        library.begin_edit().unwrap();
        assert!(library.commit_edit(draft("The Cloven Viscount (2nd ed.)")).unwrap());
        assert!(library.is_loaned(book.id));
    }

    #[test]
    fn delete_selected_respects_loans() {
        let mut library = library();
        let book = library.add_book(draft("The Nonexistent Knight")).unwrap();
        library.create_loan(book.id, "Agilulf", 4).unwrap();
        library.toggle_select(book.id).unwrap();

        let err = library.delete_selected().unwrap_err();
        assert!(matches!(err, LibraryError::BookOnLoan(_)));
        assert!(err.is_rejection());
        assert_eq!(library.books().len(), 1);

        library.return_loan(book.id).unwrap();
        let removed = library.delete_selected().unwrap();
        assert_eq!(removed.id, book.id);
        assert!(library.books().is_empty());
    }

    #[test]
    fn deleting_the_book_under_edit_closes_the_session() {
        let mut library = library();
        let book = library.add_book(draft("Marcovaldo")).unwrap();
        library.toggle_select(book.id).unwrap();
        library.begin_edit().unwrap();

        library.request_delete(book.id).unwrap();
        assert!(library.editing().is_none());
        assert!(!library.commit_edit(draft("Ghost")).unwrap());
    }

    #[test]
    fn unknown_ids_are_ignored_by_delete_and_return() {
        let mut library = library();
        library.add_book(draft("Six Memos")).unwrap();
        let ghost = BookId::generate();

        assert!(library.request_delete(ghost).unwrap().is_none());
        assert!(library.return_loan(ghost).unwrap().is_none());
        assert_eq!(library.books().len(), 1);
    }

    #[test]
    fn failed_saves_leave_memory_untouched() {
        let mut library = Library::load(FlakyStorage::default()).unwrap();
        let book = library.add_book(draft("Italian Folktales")).unwrap();
        library.storage.fail_writes = true;

        let err = library.add_book(draft("Lost")).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Persistence {
                collection: Collection::Books,
                ..
            }
        ));
        assert!(!err.is_rejection());
        assert_eq!(library.books().len(), 1);

        let err = library.create_loan(book.id, "Nobody", 1).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Persistence {
                collection: Collection::Loans,
                ..
            }
        ));
        assert!(library.loans().is_empty());
        assert!(!library.is_loaned(book.id));

        assert!(library.toggle_select(book.id).is_err());
        assert!(library.selected_book().is_none());
    }

    #[test]
    fn filtered_books_keep_catalog_order() {
        let mut library = library();
        library.add_book(draft("A")).unwrap();
        library
            .add_book(BookDraft {
                publisher: Some("Mondadori".to_string()),
                ..draft("B")
            })
            .unwrap();
        library.add_book(draft("C")).unwrap();

        let einaudi = PublisherFilter::Named("Einaudi".to_string());
        let titles: Vec<_> = library
            .filtered_books(&einaudi)
            .iter()
            .map(|book| book.title.as_str())
            .collect();
        assert_eq!(titles, ["A", "C"]);
        assert_eq!(library.filtered_books(&PublisherFilter::All).len(), 3);
        assert_eq!(library.publisher_options().len(), 3);
    }
}

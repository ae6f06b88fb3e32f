use tracing::warn;

use crate::models::{Book, BookDraft, BookId};

use super::identity::IdentityResolver;

/// The ordered catalog. Insertion order is the display order; filtered views
/// are computed on top of it and never reorder the underlying list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookStore {
    books: Vec<Book>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from persisted records. If the stored data carries
    /// more than one selected book, only the first keeps its flag.
    pub fn from_books(mut books: Vec<Book>) -> Self {
        let mut seen_selected = false;
        for book in books.iter_mut().filter(|book| book.selected) {
            if seen_selected {
                warn!(book = %book.id, "dropping extra selection from stored catalog");
                book.selected = false;
            }
            seen_selected = true;
        }
        Self { books }
    }

    /// Append a new, unselected book built from the draft.
    pub fn add(&mut self, draft: BookDraft) -> &Book {
        let index = self.books.len();
        self.books.push(Book::from_draft(BookId::generate(), draft));
        &self.books[index]
    }

    /// Flip the target's selection and clear every other book. Returns `false`
    /// without touching anything when the id is unknown.
    pub fn toggle_select(&mut self, id: BookId) -> bool {
        if !self.contains(id) {
            return false;
        }
        for book in &mut self.books {
            book.selected = book.id == id && !book.selected;
        }
        true
    }

    /// Replace all fields of the matching book except its id. The updated
    /// book ends up unselected. Returns `false` when nothing matched.
    pub fn update(&mut self, id: BookId, draft: BookDraft) -> bool {
        match self.books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                book.apply_draft(draft);
                true
            }
            None => false,
        }
    }

    /// Drop the matching book. Callers are expected to have consulted
    /// `ConsistencyGuard` first; loans are not checked here.
    pub fn remove(&mut self, id: BookId) -> Option<Book> {
        let index = self.books.iter().position(|book| book.id == id)?;
        Some(self.books.remove(index))
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.books.iter().find(|book| book.selected)
    }

    pub fn all(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl IdentityResolver for BookStore {
    fn resolve(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }
}

use crate::models::{Book, BookId};

/// Maps books to the identifiers loans use as foreign keys and back again.
///
/// Lookups always go through the identifier, never through a position in the
/// catalog, so references stay valid when books before them are deleted or a
/// filtered view reorders what is shown.
pub trait IdentityResolver {
    /// Identifier of a book, fixed for its whole lifetime.
    fn id_of(&self, book: &Book) -> BookId {
        book.id
    }

    /// Look a book up by identifier.
    fn resolve(&self, id: BookId) -> Option<&Book>;

    fn contains(&self, id: BookId) -> bool {
        self.resolve(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::BookStore;
    use crate::models::BookDraft;

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Anon".to_string(),
            ..BookDraft::default()
        }
    }

    #[test]
    fn resolve_survives_removal_of_earlier_books() {
        let mut store = BookStore::new();
        let first = store.add(draft("First")).id;
        let second = store.add(draft("Second")).id;
        let third = store.add(draft("Third")).id;

        store.remove(first);

        assert_eq!(store.resolve(second).map(|b| b.title.as_str()), Some("Second"));
        assert_eq!(store.resolve(third).map(|b| b.title.as_str()), Some("Third"));
        assert!(store.resolve(first).is_none());
    }

    #[test]
    fn id_of_is_stable_across_edits() {
        let mut store = BookStore::new();
        let id = store.add(draft("Before")).id;
        store.update(id, draft("After"));

        let book = store.resolve(id).cloned().unwrap();
        assert_eq!(store.id_of(&book), id);
        assert_eq!(book.title, "After");
    }

    #[test]
    fn fresh_identifiers_are_distinct() {
        let mut store = BookStore::new();
        let a = store.add(draft("Same")).id;
        let b = store.add(draft("Same")).id;
        assert_ne!(a, b);
    }
}

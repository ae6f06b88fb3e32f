//! Domain records shared by the catalog, the loan ledger, the persistence
//! gateway and the terminal front-end. The types stay plain data holders; the
//! rules that keep them consistent live in `library`.

use std::fmt;

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Stable identifier assigned to a book when it enters the catalog. Loans use
/// it as their foreign key, so it never depends on where the book sits in the
/// catalog or in a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(Uuid);

impl BookId {
    /// Issue a fresh identifier. Random v4 UUIDs are never handed out twice,
    /// even across restarts or after the book that held one is deleted.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for BookId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a user can type into the book form. Adding a book turns a draft
/// into a [`Book`]; editing replaces every field of an existing book with the
/// draft's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub cover_image_url: Option<String>,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub cover_image_url: Option<String>,
    /// Transient UI selection. At most one book in a catalog carries `true`.
    pub selected: bool,
}

impl Book {
    /// Materialize a draft under the given identifier, unselected.
    pub fn from_draft(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            publisher: draft.publisher,
            year: draft.year,
            language: draft.language,
            page_count: draft.page_count,
            cover_image_url: draft.cover_image_url,
            selected: false,
        }
    }

    /// Overwrite every field except `id`, clearing the selection.
    pub fn apply_draft(&mut self, draft: BookDraft) {
        let id = self.id;
        *self = Self::from_draft(id, draft);
    }

    /// Snapshot the editable fields back into a draft, e.g. to seed the edit
    /// form.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            year: self.year,
            language: self.language.clone(),
            page_count: self.page_count,
            cover_image_url: self.cover_image_url.clone(),
        }
    }

    /// Publisher with surrounding whitespace removed, or `None` when blank.
    pub fn trimmed_publisher(&self) -> Option<&str> {
        self.publisher
            .as_deref()
            .map(str::trim)
            .filter(|publisher| !publisher.is_empty())
    }

    /// `Title - Author`, omitting the hyphen when the author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// An active loan of one book to one borrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    /// Non-owning reference into the catalog.
    pub book_id: BookId,
    pub borrower_name: String,
    /// Always within `1..=4`.
    pub duration_weeks: u32,
    pub started_at: DateTime<Local>,
    /// Computed once at creation from `started_at` and `duration_weeks`.
    pub due_at: DateTime<Local>,
}

//! Error type for the catalog and loan rules.

use std::fmt;

use thiserror::Error;

use crate::models::BookId;

/// The two independently persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Books,
    Loans,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Loans => "loans",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures surfaced by [`crate::Library`] and its components.
///
/// Every variant except [`LibraryError::Persistence`] is a rejection: the
/// request was refused before anything changed and the caller only needs to
/// show the message.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No book with id {0} exists.")]
    InvalidReference(BookId),

    #[error("This book is already on loan.")]
    AlreadyLoaned(BookId),

    #[error("Loan period must be between 1 and 4 weeks (got {0}).")]
    InvalidDuration(u32),

    #[error("This book is currently on loan and cannot be deleted.")]
    BookOnLoan(BookId),

    #[error("No book is selected.")]
    NoSelection,

    #[error("Borrower name is required.")]
    BlankBorrower,

    #[error("Could not save {collection}.")]
    Persistence {
        collection: Collection,
        #[source]
        source: anyhow::Error,
    },
}

impl LibraryError {
    /// `true` for refused requests, `false` for storage failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LibraryError::Persistence { .. })
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;

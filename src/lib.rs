//! Personal library tracker: a catalog of books, who borrowed what, and a
//! terminal UI over both.
//!
//! All rule enforcement lives in [`Library`]; the `ui` module only renders
//! its state and forwards requests.
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod storage;
pub mod ui;

pub use config::AppConfig;
pub use db::SqliteStorage;
pub use error::{Collection, LibraryError, LibraryResult};
pub use library::{Library, PublisherFilter};
pub use logging::init_logging;
pub use models::{Book, BookDraft, BookId, Loan};
pub use storage::{MemoryStorage, Storage};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

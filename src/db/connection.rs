use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Open (creating if needed) the SQLite file at `path` and make sure both
/// collection tables exist.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    ensure_schema(&conn)?;
    debug!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Throwaway database living only as long as the connection.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Run the lazy migrations. The two tables are independent snapshots, so
/// `loans.book_id` deliberately carries no foreign key: the catalog and the
/// ledger are saved separately and the loan rules live in the core model.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id BLOB PRIMARY KEY,
            position INTEGER NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT,
            year INTEGER,
            language TEXT,
            page_count INTEGER,
            cover_image_url TEXT,
            selected INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("failed to create books table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS loans (
            book_id BLOB PRIMARY KEY,
            position INTEGER NOT NULL,
            borrower_name TEXT NOT NULL,
            duration_weeks INTEGER NOT NULL CHECK (duration_weeks BETWEEN 1 AND 4),
            started_at TEXT NOT NULL,
            due_at TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create loans table")?;

    Ok(())
}

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::trace;

use crate::models::Book;

/// Every book in catalog order.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, author, publisher, year, language, page_count,
                    cover_image_url, selected
             FROM books
             ORDER BY position",
        )
        .context("failed to prepare books query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                publisher: row.get(3)?,
                year: row.get(4)?,
                language: row.get(5)?,
                page_count: row.get(6)?,
                cover_image_url: row.get(7)?,
                selected: row.get(8)?,
            })
        })
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Swap the stored catalog for `books` in one transaction, so a failure
/// midway leaves the previous snapshot intact.
pub fn replace_books(conn: &mut Connection, books: &[Book]) -> Result<()> {
    let tx = conn
        .transaction()
        .context("failed to begin books transaction")?;
    tx.execute("DELETE FROM books", [])
        .context("failed to clear books")?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO books (id, position, title, author, publisher, year, language,
                                    page_count, cover_image_url, selected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .context("failed to prepare book insert")?;

        for (position, book) in books.iter().enumerate() {
            stmt.execute(params![
                book.id,
                position as i64,
                book.title,
                book.author,
                book.publisher,
                book.year,
                book.language,
                book.page_count,
                book.cover_image_url,
                book.selected,
            ])
            .with_context(|| format!("failed to insert book \"{}\"", book.title))?;
        }
    }

    tx.commit().context("failed to commit books")?;
    trace!(rows = books.len(), "books table replaced");
    Ok(())
}

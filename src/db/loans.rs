use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::trace;

use crate::models::Loan;

/// Every active loan in creation order.
pub fn fetch_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn
        .prepare(
            "SELECT book_id, borrower_name, duration_weeks, started_at, due_at
             FROM loans
             ORDER BY position",
        )
        .context("failed to prepare loans query")?;

    let loans = stmt
        .query_map([], |row| {
            Ok(Loan {
                book_id: row.get(0)?,
                borrower_name: row.get(1)?,
                duration_weeks: row.get(2)?,
                started_at: row.get(3)?,
                due_at: row.get(4)?,
            })
        })
        .context("failed to load loans")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect loans")?;

    Ok(loans)
}

/// Swap the stored ledger for `loans` in one transaction.
pub fn replace_loans(conn: &mut Connection, loans: &[Loan]) -> Result<()> {
    let tx = conn
        .transaction()
        .context("failed to begin loans transaction")?;
    tx.execute("DELETE FROM loans", [])
        .context("failed to clear loans")?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO loans (book_id, position, borrower_name, duration_weeks,
                                    started_at, due_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .context("failed to prepare loan insert")?;

        for (position, loan) in loans.iter().enumerate() {
            stmt.execute(params![
                loan.book_id,
                position as i64,
                loan.borrower_name,
                loan.duration_weeks,
                loan.started_at,
                loan.due_at,
            ])
            .with_context(|| format!("failed to insert loan for {}", loan.borrower_name))?;
        }
    }

    tx.commit().context("failed to commit loans")?;
    trace!(rows = loans.len(), "loans table replaced");
    Ok(())
}

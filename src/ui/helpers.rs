use anyhow::Error;
use chrono::{DateTime, Local};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, Loan};

/// Cut `text` down to `width` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(width - 1).collect();
    truncated.push('…');
    truncated
}

/// Build the textual payload of a book card: title, author, publisher and
/// the loan badge.
pub(crate) fn book_card_lines(book: &Book, loaned: bool, inner_width: u16) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    if width == 0 {
        return vec![Line::from("")];
    }

    let title_style = if book.selected {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![
        Line::from(Span::styled(truncate_to_width(&book.title, width), title_style)),
        Line::from(truncate_to_width(&format!("by {}", book.author), width)),
    ];

    if let Some(publisher) = book.trimmed_publisher() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(publisher, width),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if loaned {
        lines.push(Line::from(Span::styled(
            "On Loan",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    lines
}

/// One-line summary used by the active loans list.
pub(crate) fn loan_summary(loan: &Loan, title: Option<&str>) -> String {
    format!(
        "{} | {} | {} | Due {}",
        loan.borrower_name,
        title.unwrap_or("(missing book)"),
        weeks_label(loan.duration_weeks),
        format_date(&loan.due_at),
    )
}

pub(crate) fn weeks_label(weeks: u32) -> String {
    if weeks == 1 {
        "1 week".to_string()
    } else {
        format!("{weeks} weeks")
    }
}

pub(crate) fn format_date(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

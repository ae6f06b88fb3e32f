use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::library::{Library, PublisherFilter};
use crate::models::{Book, BookId};
use crate::storage::Storage;

use super::forms::{
    BookChoice, BookField, BookForm, ConfirmBookDelete, ConfirmLoanReturn, LoanField, LoanForm,
};
use super::helpers::{book_card_lines, centered_rect, format_date, loan_summary, surface_error};

/// Number of book cards shown in each row of the catalog grid.
const GRID_COLUMNS: usize = 4;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 2;
const CARD_HEIGHT: u16 = 6;

enum Screen {
    Books,
    Loans,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook(BookForm),
    ConfirmBookDelete(ConfirmBookDelete),
    CreatingLoan(LoanForm),
    ConfirmLoanReturn(ConfirmLoanReturn),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Front-end state. All catalog and loan changes go through `library`; the
/// app itself only tracks the cursor, the filter and the open popup.
pub struct App<S: Storage> {
    library: Library<S>,
    screen: Screen,
    mode: Mode,
    /// Position within the filtered catalog view.
    cursor: usize,
    loan_cursor: usize,
    filter: PublisherFilter,
    status: Option<StatusMessage>,
}

impl<S: Storage> App<S> {
    pub fn new(library: Library<S>) -> Self {
        Self {
            library,
            screen: Screen::Books,
            mode: Mode::Normal,
            cursor: 0,
            loan_cursor: 0,
            filter: PublisherFilter::All,
            status: None,
        }
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_book_form(code, form, false)?,
            Mode::EditingBook(form) => self.handle_book_form(code, form, true)?,
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::CreatingLoan(form) => self.handle_loan_form(code, form)?,
            Mode::ConfirmLoanReturn(confirm) => self.handle_confirm_return(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Books => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Left => self.move_cursor(-1),
                KeyCode::Right => self.move_cursor(1),
                KeyCode::Up => self.move_cursor(-(GRID_COLUMNS as isize)),
                KeyCode::Down => self.move_cursor(GRID_COLUMNS as isize),
                KeyCode::Char(' ') => self.toggle_current(),
                KeyCode::Char('+') => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::default()));
                }
                KeyCode::Char('e') | KeyCode::Char('E') => return Ok(self.begin_edit()),
                KeyCode::Char('-') => return Ok(self.begin_delete()),
                KeyCode::Char('f') | KeyCode::Char('F') => self.cycle_filter(),
                KeyCode::Char('c') | KeyCode::Char('C') => self.clear_filter(),
                KeyCode::Char('o') | KeyCode::Char('O') => self.open_cover(),
                KeyCode::Char('l') | KeyCode::Char('L') => {
                    self.clear_status();
                    self.screen = Screen::Loans;
                    self.clamp_loan_cursor();
                }
                _ => {}
            },
            Screen::Loans => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                    self.clear_status();
                    self.screen = Screen::Books;
                    self.clamp_cursor();
                }
                KeyCode::Up => self.move_loan_cursor(-1),
                KeyCode::Down => self.move_loan_cursor(1),
                KeyCode::Char('+') => return Ok(self.begin_loan()),
                KeyCode::Char('r') | KeyCode::Char('R') => return Ok(self.begin_return()),
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn handle_book_form(&mut self, code: KeyCode, mut form: BookForm, editing: bool) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if editing {
                    self.library.cancel_edit();
                    self.set_status("Edit cancelled.", StatusKind::Info);
                } else {
                    self.set_status("Add book cancelled.", StatusKind::Info);
                }
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_book_form(&form, editing) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        Ok(match (keep_open, editing) {
            (true, true) => Mode::EditingBook(form),
            (true, false) => Mode::AddingBook(form),
            (false, _) => Mode::Normal,
        })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.library.request_delete(confirm.id) {
                    Ok(_) => {
                        self.clamp_cursor();
                        self.set_status(format!("Deleted \"{}\".", confirm.title), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) if err.is_rejection() => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err.into()), StatusKind::Error);
                        Ok(Mode::ConfirmBookDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmBookDelete(confirm)),
        }
    }

    fn handle_loan_form(&mut self, code: KeyCode, mut form: LoanForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Loan cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left if form.active == LoanField::Book => form.cycle_choice(-1),
            KeyCode::Right if form.active == LoanField::Book => form.cycle_choice(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_loan_form(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::CreatingLoan(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_return(&mut self, code: KeyCode, confirm: ConfirmLoanReturn) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Return cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.library.return_loan(confirm.book_id) {
                    Ok(Some(_)) => {
                        self.clamp_loan_cursor();
                        self.set_status(
                            format!("{} returned \"{}\".", confirm.borrower, confirm.title),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Ok(None) => {
                        self.set_status("That loan no longer exists.", StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err.into()), StatusKind::Error);
                        Ok(Mode::ConfirmLoanReturn(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmLoanReturn(confirm)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.screen {
            Screen::Books => self.draw_books(frame, content_area),
            Screen::Loans => self.draw_loans(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook(form) => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::CreatingLoan(form) => self.draw_loan_form(frame, area, form),
            Mode::ConfirmLoanReturn(confirm) => self.draw_confirm_return(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(area);

        let header = vec![
            Line::from(Span::styled(
                format!(
                    "Library: {} books, {} on loan",
                    self.library.books().len(),
                    self.library.loans().len()
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw("Publisher: "),
                Span::styled(self.filter.to_string(), Style::default().fg(Color::Cyan)),
            ]),
        ];
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let grid_area = chunks[1];
        let books = self.visible_books();
        if books.is_empty() {
            let text = if self.library.books().is_empty() {
                "No books yet. Press '+' to add one."
            } else {
                "No books found for this publisher."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, grid_area);
            return;
        }

        let visible_rows = usize::from((grid_area.height / CARD_HEIGHT).max(1));
        let cursor_row = self.cursor / GRID_COLUMNS;
        let first_row = (cursor_row + 1).saturating_sub(visible_rows);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(grid_area);

        for (offset, row_area) in rows.iter().enumerate() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_area);

            for (col_idx, cell) in columns.iter().enumerate() {
                let index = (first_row + offset) * GRID_COLUMNS + col_idx;
                let Some(book) = books.get(index) else {
                    continue;
                };

                let mut block = Block::default().borders(Borders::ALL);
                if book.selected {
                    block = block
                        .title("Selected")
                        .border_style(Style::default().fg(Color::Green));
                }
                if index == self.cursor {
                    block = block.border_style(Style::default().fg(Color::Yellow));
                }

                let lines = book_card_lines(
                    book,
                    self.library.is_loaned(book.id),
                    cell.width.saturating_sub(2),
                );
                frame.render_widget(Paragraph::new(lines).block(block), *cell);
            }
        }
    }

    fn draw_loans(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(area);

        let available = self.library.available_books().len();
        let availability = if available == 0 {
            Span::styled("Nothing can be loaned.", Style::default().fg(Color::Red))
        } else {
            Span::raw(format!("{available} available to borrow"))
        };
        let header = vec![
            Line::from(Span::styled(
                "Manage Loans",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(availability),
        ];
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let loans = self.library.loans();
        if loans.is_empty() {
            let message = Paragraph::new("No books are currently loaned.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = loans
            .iter()
            .map(|loan| {
                let title = self.library.resolve(loan.book_id).map(|book| book.title.as_str());
                ListItem::new(loan_summary(loan, title))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Currently On Loan"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.loan_cursor));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_) | Mode::EditingBook(_)) => {
                &[("[Tab]", "Next field"), ("[Enter]", "Save"), ("[Esc]", "Cancel")]
            }
            (_, Mode::CreatingLoan(_)) => &[
                ("[Tab]", "Next field"),
                ("[←→]", "Choose book"),
                ("[Enter]", "Submit"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmBookDelete(_) | Mode::ConfirmLoanReturn(_)) => {
                &[("[Y]", "Confirm"), ("[N]", "Cancel")]
            }
            (Screen::Books, Mode::Normal) => &[
                ("[Space]", "Select"),
                ("[+]", "Add"),
                ("[E]", "Edit"),
                ("[-]", "Delete"),
                ("[F]", "Filter"),
                ("[C]", "Clear filter"),
                ("[O]", "Open cover"),
                ("[L]", "Loans"),
                ("[Q]", "Quit"),
            ],
            (Screen::Loans, Mode::Normal) => &[
                ("[↑↓]", "Navigate"),
                ("[+]", "Borrow"),
                ("[R]", "Return"),
                ("[Esc]", "Back to library"),
                ("[Q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(pairs.len() * 2);
        for (key, action) in pairs {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref(), "Enter to save • Tab to switch • Esc to cancel"));

        frame.render_widget(Paragraph::new(lines), inner);

        let prefix = format!("{}: ", form.active.label()).chars().count();
        let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
        let cursor_y = inner.y + form.active.row() as u16;
        if cursor_y < inner.y + inner.height {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Borrow a Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(LoanField::Borrower),
            form.build_line(LoanField::Book),
            form.build_line(LoanField::Weeks),
            Line::from(""),
            form_hint(
                form.error.as_deref(),
                "Enter to submit • Tab to switch • ←/→ to pick a book • Esc to cancel",
            ),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if form.active != LoanField::Book {
            let prefix = format!("{}: ", form.active.label()).chars().count();
            let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
            let cursor_y = inner.y + form.active.row() as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let lines = vec![
            Line::from(format!("Delete \"{}\" from the library?", confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_confirm(frame, area, "Confirm Deletion", lines);
    }

    fn draw_confirm_return(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmLoanReturn) {
        let lines = vec![
            Line::from(format!(
                "Mark \"{}\" as returned by {}?",
                confirm.title, confirm.borrower
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        draw_confirm(frame, area, "Confirm Return", lines);
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn visible_books(&self) -> Vec<&Book> {
        self.library.filtered_books(&self.filter)
    }

    fn current_book(&self) -> Option<&Book> {
        self.visible_books().get(self.cursor).copied()
    }

    fn book_title(&self, id: BookId) -> String {
        self.library
            .resolve(id)
            .map(|book| book.title.clone())
            .unwrap_or_else(|| "(missing book)".to_string())
    }

    fn toggle_current(&mut self) {
        let Some(id) = self.current_book().map(|book| book.id) else {
            self.set_status("No book under the cursor.", StatusKind::Error);
            return;
        };
        match self.library.toggle_select(id) {
            Ok(()) => self.clear_status(),
            Err(err) => self.set_status(surface_error(&err.into()), StatusKind::Error),
        }
    }

    fn begin_edit(&mut self) -> Mode {
        match self.library.begin_edit().map(BookForm::from_book) {
            Ok(form) => {
                self.clear_status();
                Mode::EditingBook(form)
            }
            Err(err) => {
                self.set_status(format!("{err} Press Space to select one."), StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn begin_delete(&mut self) -> Mode {
        let selected = self
            .library
            .selected_book()
            .map(|book| (ConfirmBookDelete::from(book), self.library.can_delete(book.id)));

        match selected {
            None => {
                self.set_status(
                    "No book is selected. Press Space to select one.",
                    StatusKind::Error,
                );
                Mode::Normal
            }
            Some((_, false)) => {
                self.set_status(
                    "This book is currently on loan and cannot be deleted.",
                    StatusKind::Error,
                );
                Mode::Normal
            }
            Some((confirm, true)) => {
                self.clear_status();
                Mode::ConfirmBookDelete(confirm)
            }
        }
    }

    fn save_book_form(&mut self, form: &BookForm, editing: bool) -> Result<()> {
        let draft = form.parse_inputs()?;
        if editing {
            let title = draft.title.clone();
            if self.library.commit_edit(draft)? {
                self.set_status(format!("Updated \"{title}\"."), StatusKind::Info);
            } else {
                self.set_status("The book being edited no longer exists.", StatusKind::Error);
            }
        } else {
            let book = self.library.add_book(draft)?;
            self.focus_book(book.id);
            self.set_status(format!("Added \"{}\".", book.title), StatusKind::Info);
        }
        Ok(())
    }

    fn cycle_filter(&mut self) {
        let options = self.library.publisher_options();
        self.filter = self.filter.next(&options);
        self.cursor = 0;
        self.set_status(format!("Filtering by publisher: {}", self.filter), StatusKind::Info);
    }

    fn clear_filter(&mut self) {
        self.filter = PublisherFilter::All;
        self.clamp_cursor();
        self.set_status("Showing all publishers.", StatusKind::Info);
    }

    fn open_cover(&mut self) {
        let Some((title, url)) = self
            .current_book()
            .map(|book| (book.title.clone(), book.cover_image_url.clone()))
        else {
            self.set_status("No book under the cursor.", StatusKind::Error);
            return;
        };

        match url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            None => self.set_status("This book does not have a cover URL.", StatusKind::Error),
            Some(url) => match open_link(url) {
                Ok(()) => self.set_status(format!("Opened cover of \"{title}\"."), StatusKind::Info),
                Err(err) => {
                    self.set_status(format!("Failed to open cover: {err}"), StatusKind::Error)
                }
            },
        }
    }

    fn begin_loan(&mut self) -> Mode {
        let choices: Vec<BookChoice> = self
            .library
            .available_books()
            .into_iter()
            .map(|book| BookChoice {
                id: book.id,
                title: book.display_title(),
            })
            .collect();

        if choices.is_empty() {
            self.set_status("Nothing can be loaned.", StatusKind::Error);
            return Mode::Normal;
        }

        let mut form = LoanForm::new(choices);
        if let Some(id) = self.library.selected_book().map(|book| book.id) {
            form.preselect(id);
        }
        self.clear_status();
        Mode::CreatingLoan(form)
    }

    fn save_loan_form(&mut self, form: &LoanForm) -> Result<()> {
        let (book_id, borrower, weeks) = form.parse_inputs()?;
        let loan = self.library.create_loan(book_id, &borrower, weeks)?;
        self.loan_cursor = self.library.loans().len().saturating_sub(1);
        let title = self.book_title(loan.book_id);
        self.set_status(
            format!(
                "Loaned \"{title}\" to {} until {}.",
                loan.borrower_name,
                format_date(&loan.due_at)
            ),
            StatusKind::Info,
        );
        Ok(())
    }

    fn begin_return(&mut self) -> Mode {
        let Some(loan) = self.library.loans().get(self.loan_cursor).cloned() else {
            self.set_status("No loan selected.", StatusKind::Error);
            return Mode::Normal;
        };
        let title = self.book_title(loan.book_id);
        self.clear_status();
        Mode::ConfirmLoanReturn(ConfirmLoanReturn::new(&loan, title))
    }

    fn focus_book(&mut self, id: BookId) {
        if let Some(index) = self.visible_books().iter().position(|book| book.id == id) {
            self.cursor = index;
        }
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.visible_books().len() as isize;
        let target = self.cursor as isize + offset;
        if (0..len).contains(&target) {
            self.cursor = target as usize;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_books().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn move_loan_cursor(&mut self, offset: isize) {
        let len = self.library.loans().len() as isize;
        let target = self.loan_cursor as isize + offset;
        if (0..len).contains(&target) {
            self.loan_cursor = target as usize;
        }
    }

    fn clamp_loan_cursor(&mut self) {
        let len = self.library.loans().len();
        if self.loan_cursor >= len {
            self.loan_cursor = len.saturating_sub(1);
        }
    }
}

fn form_hint(error: Option<&str>, hint: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )),
    }
}

fn draw_confirm(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookDraft, BookId, Loan};

/// Fields of the book form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Publisher,
    Year,
    Language,
    Pages,
    Cover,
}

impl BookField {
    pub(crate) const ALL: [BookField; 7] = [
        BookField::Title,
        BookField::Author,
        BookField::Publisher,
        BookField::Year,
        BookField::Language,
        BookField::Pages,
        BookField::Cover,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Publisher => "Publisher",
            BookField::Year => "Year",
            BookField::Language => "Language",
            BookField::Pages => "Pages",
            BookField::Cover => "Cover URL",
        }
    }

    fn required(self) -> bool {
        matches!(self, BookField::Title | BookField::Author)
    }

    fn numeric(self) -> bool {
        matches!(self, BookField::Year | BookField::Pages)
    }

    /// Row of the field inside the form popup.
    pub(crate) fn row(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }

    fn offset(self, step: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let index = (self.row() as isize + step).rem_euclid(len);
        Self::ALL[index as usize]
    }
}

/// Text buffers behind the add/edit book popup.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) publisher: String,
    pub(crate) year: String,
    pub(crate) language: String,
    pub(crate) pages: String,
    pub(crate) cover: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Populate the form from an existing book when editing.
    pub(crate) fn from_book(book: &Book) -> Self {
        let draft = book.to_draft();
        Self {
            title: draft.title,
            author: draft.author,
            publisher: draft.publisher.unwrap_or_default(),
            year: draft.year.map(|year| year.to_string()).unwrap_or_default(),
            language: draft.language.unwrap_or_default(),
            pages: draft
                .page_count
                .map(|pages| pages.to_string())
                .unwrap_or_default(),
            cover: draft.cover_image_url.unwrap_or_default(),
            active: BookField::Title,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.offset(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.offset(-1);
    }

    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Publisher => &self.publisher,
            BookField::Year => &self.year,
            BookField::Language => &self.language,
            BookField::Pages => &self.pages,
            BookField::Cover => &self.cover,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Publisher => &mut self.publisher,
            BookField::Year => &mut self.year,
            BookField::Language => &mut self.language,
            BookField::Pages => &mut self.pages,
            BookField::Cover => &mut self.cover,
        }
    }

    /// Append a character to the active field. Numeric fields only take
    /// digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || (self.active.numeric() && !ch.is_ascii_digit()) {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs and build the draft handed to the library.
    pub(crate) fn parse_inputs(&self) -> Result<BookDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author is required."));
        }
        let year = optional_text(&self.year)
            .map(|raw| raw.parse::<i32>())
            .transpose()
            .context("Publication year must be a whole number.")?;
        let page_count = optional_text(&self.pages)
            .map(|raw| raw.parse::<u32>())
            .transpose()
            .context("Page count must be a whole number.")?;

        Ok(BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            publisher: optional_text(&self.publisher).map(str::to_string),
            year,
            language: optional_text(&self.language).map(str::to_string),
            page_count,
            cover_image_url: optional_text(&self.cover).map(str::to_string),
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let placeholder = if field.required() {
            "<required>"
        } else {
            "<optional>"
        };
        field_line(
            field.label(),
            value,
            placeholder,
            self.active == field,
        )
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the loan form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum LoanField {
    #[default]
    Borrower,
    Book,
    Weeks,
}

impl LoanField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            LoanField::Borrower => "Borrower",
            LoanField::Book => "Book",
            LoanField::Weeks => "Loan Period (weeks)",
        }
    }

    pub(crate) fn row(self) -> usize {
        match self {
            LoanField::Borrower => 0,
            LoanField::Book => 1,
            LoanField::Weeks => 2,
        }
    }
}

/// One entry of the book chooser.
#[derive(Clone)]
pub(crate) struct BookChoice {
    pub(crate) id: BookId,
    pub(crate) title: String,
}

/// "Borrow a Book" popup. The chooser only ever lists available books.
#[derive(Clone)]
pub(crate) struct LoanForm {
    pub(crate) borrower: String,
    pub(crate) choices: Vec<BookChoice>,
    pub(crate) choice: usize,
    pub(crate) weeks: String,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
}

impl LoanForm {
    pub(crate) fn new(choices: Vec<BookChoice>) -> Self {
        Self {
            borrower: String::new(),
            choices,
            choice: 0,
            weeks: "1".to_string(),
            active: LoanField::Borrower,
            error: None,
        }
    }

    /// Start the chooser on a particular book when it is among the choices.
    pub(crate) fn preselect(&mut self, id: BookId) {
        if let Some(index) = self.choices.iter().position(|choice| choice.id == id) {
            self.choice = index;
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            LoanField::Borrower => LoanField::Book,
            LoanField::Book => LoanField::Weeks,
            LoanField::Weeks => LoanField::Borrower,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            LoanField::Borrower => LoanField::Weeks,
            LoanField::Book => LoanField::Borrower,
            LoanField::Weeks => LoanField::Book,
        };
    }

    /// Step through the book chooser, wrapping at either end.
    pub(crate) fn cycle_choice(&mut self, step: isize) {
        if self.choices.is_empty() {
            return;
        }
        let len = self.choices.len() as isize;
        self.choice = (self.choice as isize + step).rem_euclid(len) as usize;
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            LoanField::Borrower if !ch.is_control() => {
                self.borrower.push(ch);
                true
            }
            LoanField::Weeks if ch.is_ascii_digit() => {
                self.weeks.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoanField::Borrower => {
                self.borrower.pop();
            }
            LoanField::Weeks => {
                self.weeks.pop();
            }
            LoanField::Book => {}
        }
    }

    pub(crate) fn current_choice(&self) -> Option<&BookChoice> {
        self.choices.get(self.choice)
    }

    /// Validate the inputs. The 1–4 week range is enforced by the ledger.
    pub(crate) fn parse_inputs(&self) -> Result<(BookId, String, u32)> {
        let borrower = self.borrower.trim();
        if borrower.is_empty() {
            return Err(anyhow!("Borrower name is required."));
        }
        let book = self
            .current_choice()
            .ok_or_else(|| anyhow!("Nothing can be loaned."))?;
        let weeks_raw = self.weeks.trim();
        if weeks_raw.is_empty() {
            return Err(anyhow!("Loan period is required."));
        }
        let weeks = weeks_raw
            .parse::<u32>()
            .context("Loan period must be a number of weeks.")?;
        Ok((book.id, borrower.to_string(), weeks))
    }

    pub(crate) fn build_line(&self, field: LoanField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            LoanField::Borrower => field_line(field.label(), &self.borrower, "<required>", is_active),
            LoanField::Weeks => field_line(field.label(), &self.weeks, "<1-4>", is_active),
            LoanField::Book => {
                let title = self
                    .current_choice()
                    .map(|choice| format!("< {} >", choice.title))
                    .unwrap_or_else(|| "<none available>".to_string());
                field_line(field.label(), &title, "", is_active)
            }
        }
    }

    pub(crate) fn value_len(&self, field: LoanField) -> usize {
        match field {
            LoanField::Borrower => self.borrower.chars().count(),
            LoanField::Weeks => self.weeks.chars().count(),
            LoanField::Book => 0,
        }
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: BookId,
    pub(crate) title: String,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

/// State for confirming that a borrower brought a book back.
#[derive(Clone)]
pub(crate) struct ConfirmLoanReturn {
    pub(crate) book_id: BookId,
    pub(crate) title: String,
    pub(crate) borrower: String,
}

impl ConfirmLoanReturn {
    pub(crate) fn new(loan: &Loan, title: String) -> Self {
        Self {
            book_id: loan.book_id,
            title,
            borrower: loan.borrower_name.clone(),
        }
    }
}

fn optional_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn field_line(label: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut BookForm, field: BookField, text: &str) {
        form.active = field;
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn book_form_requires_title_and_author() {
        let mut form = BookForm::default();
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Book title is required."
        );

        type_into(&mut form, BookField::Title, "Kindred");
        assert_eq!(form.parse_inputs().unwrap_err().to_string(), "Author is required.");
    }

    #[test]
    fn book_form_builds_a_trimmed_draft() {
        let mut form = BookForm::default();
        type_into(&mut form, BookField::Title, " Kindred ");
        type_into(&mut form, BookField::Author, "Octavia E. Butler");
        type_into(&mut form, BookField::Publisher, " Doubleday ");
        type_into(&mut form, BookField::Year, "19x79");
        type_into(&mut form, BookField::Pages, "264");

        let draft = form.parse_inputs().unwrap();
        assert_eq!(draft.title, "Kindred");
        assert_eq!(draft.publisher.as_deref(), Some("Doubleday"));
        assert_eq!(draft.year, Some(1979));
        assert_eq!(draft.page_count, Some(264));
        assert_eq!(draft.language, None);
        assert_eq!(draft.cover_image_url, None);
    }

    #[test]
    fn book_form_round_trips_an_existing_book() {
        let draft = BookDraft {
            title: "Dawn".to_string(),
            author: "Octavia E. Butler".to_string(),
            year: Some(1987),
            page_count: Some(248),
            cover_image_url: Some("https://example.com/dawn.jpg".to_string()),
            ..BookDraft::default()
        };
        let book = Book::from_draft(BookId::generate(), draft.clone());

        assert_eq!(BookForm::from_book(&book).parse_inputs().unwrap(), draft);
    }

    #[test]
    fn book_fields_cycle_in_both_directions() {
        let mut form = BookForm::default();
        form.previous_field();
        assert_eq!(form.active, BookField::Cover);
        form.next_field();
        form.next_field();
        assert_eq!(form.active, BookField::Author);
    }

    #[test]
    fn loan_form_validates_and_defaults_to_one_week() {
        let id = BookId::generate();
        let mut form = LoanForm::new(vec![BookChoice {
            id,
            title: "Parable of the Sower".to_string(),
        }]);
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Borrower name is required."
        );

        for ch in "Lauren".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.parse_inputs().unwrap(), (id, "Lauren".to_string(), 1));
    }

    #[test]
    fn loan_form_without_choices_refuses() {
        let mut form = LoanForm::new(Vec::new());
        form.borrower = "Nobody".to_string();
        form.cycle_choice(1);
        assert_eq!(form.parse_inputs().unwrap_err().to_string(), "Nothing can be loaned.");
    }

    #[test]
    fn loan_form_chooser_wraps_and_preselects() {
        let choices: Vec<_> = ["A", "B", "C"]
            .into_iter()
            .map(|title| BookChoice {
                id: BookId::generate(),
                title: title.to_string(),
            })
            .collect();
        let last = choices[2].id;
        let mut form = LoanForm::new(choices);

        form.cycle_choice(-1);
        assert_eq!(form.current_choice().map(|c| c.id), Some(last));
        form.cycle_choice(1);
        assert_eq!(form.choice, 0);

        form.preselect(last);
        assert_eq!(form.choice, 2);
        form.preselect(BookId::generate());
        assert_eq!(form.choice, 2);
    }
}

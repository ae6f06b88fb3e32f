use std::collections::HashSet;
use std::fmt;

use crate::models::Book;

/// Display-only catalog filter keyed on the publisher field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PublisherFilter {
    #[default]
    All,
    Named(String),
}

impl PublisherFilter {
    /// `All` matches everything; a named filter matches books whose trimmed
    /// publisher is exactly that name.
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            PublisherFilter::All => true,
            PublisherFilter::Named(name) => book.trimmed_publisher() == Some(name.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PublisherFilter::All => "All",
            PublisherFilter::Named(name) => name,
        }
    }

    /// The option after this one, wrapping around. A filter that is no longer
    /// among the options falls back to the first.
    pub fn next(&self, options: &[PublisherFilter]) -> PublisherFilter {
        let next = options
            .iter()
            .position(|option| option == self)
            .map_or(0, |index| (index + 1) % options.len().max(1));
        options.get(next).cloned().unwrap_or_default()
    }
}

impl fmt::Display for PublisherFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `All` followed by each distinct trimmed, non-empty publisher in the order
/// it first appears in the catalog. Comparison is case-sensitive.
pub fn publisher_options(books: &[Book]) -> Vec<PublisherFilter> {
    let mut seen = HashSet::new();
    let mut options = vec![PublisherFilter::All];
    for publisher in books.iter().filter_map(Book::trimmed_publisher) {
        if seen.insert(publisher) {
            options.push(PublisherFilter::Named(publisher.to_string()));
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookId;

    fn book(title: &str, publisher: Option<&str>) -> Book {
        Book {
            id: BookId::generate(),
            title: title.to_string(),
            author: "Author".to_string(),
            publisher: publisher.map(str::to_string),
            year: None,
            language: None,
            page_count: None,
            cover_image_url: None,
            selected: false,
        }
    }

    #[test]
    fn options_are_distinct_trimmed_and_ordered() {
        let books = vec![
            book("a", Some("Tor ")),
            book("b", None),
            book("c", Some("Gollancz")),
            book("d", Some("  ")),
            book("e", Some("Tor")),
            book("f", Some("tor")),
        ];

        let labels: Vec<_> = publisher_options(&books)
            .iter()
            .map(|option| option.label().to_string())
            .collect();
        assert_eq!(labels, ["All", "Tor", "Gollancz", "tor"]);
    }

    #[test]
    fn named_filter_matches_trimmed_publishers() {
        let filter = PublisherFilter::Named("Tor".to_string());
        assert!(filter.matches(&book("a", Some(" Tor"))));
        assert!(!filter.matches(&book("b", Some("tor"))));
        assert!(!filter.matches(&book("c", None)));
        assert!(PublisherFilter::All.matches(&book("d", None)));
    }

    #[test]
    fn next_cycles_and_recovers_from_stale_filters() {
        let options = vec![
            PublisherFilter::All,
            PublisherFilter::Named("Tor".to_string()),
        ];
        let tor = PublisherFilter::All.next(&options);
        assert_eq!(tor, options[1]);
        assert_eq!(tor.next(&options), PublisherFilter::All);

        let stale = PublisherFilter::Named("Gone".to_string());
        assert_eq!(stale.next(&options), PublisherFilter::All);
        assert_eq!(PublisherFilter::All.next(&[]), PublisherFilter::All);
    }
}

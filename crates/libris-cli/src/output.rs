//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! The human renderings are plain functions returning strings so the
//! interactive menu can reuse them.

use serde::Serialize;

use libris_core::{Book, Inconsistency, Reader, ReaderId};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single book with its holder
    pub fn print_book(&self, book: &Book, holder: Option<&Reader>) {
        match self.format {
            OutputFormat::Human => print!("{}", book_details(book, holder.map(Reader::id))),
            OutputFormat::Json => print_json(&serde_json::json!({
                "book": book,
                "holder": holder.map(Reader::id),
            })),
            OutputFormat::Quiet => println!("{}", book.id()),
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[&Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    println!("{}", book_line(book));
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id());
                }
            }
        }
    }

    /// Print a single reader
    pub fn print_reader(&self, reader: &Reader) {
        match self.format {
            OutputFormat::Human => print!("{}", reader_details(reader)),
            OutputFormat::Json => print_json(reader),
            OutputFormat::Quiet => println!("{}", reader.id()),
        }
    }

    /// Print a list of readers
    pub fn print_readers(&self, readers: &[&Reader]) {
        match self.format {
            OutputFormat::Human => {
                if readers.is_empty() {
                    println!("No readers found.");
                    return;
                }
                for reader in readers {
                    println!("{}", reader_line(reader));
                }
                println!("\n{} reader(s)", readers.len());
            }
            OutputFormat::Json => print_json(&readers),
            OutputFormat::Quiet => {
                for reader in readers {
                    println!("{}", reader.id());
                }
            }
        }
    }

    /// Print the result of a loan audit
    pub fn print_findings(&self, findings: &[Inconsistency]) {
        match self.format {
            OutputFormat::Human => {
                if findings.is_empty() {
                    println!("Loan records are consistent.");
                    return;
                }
                for finding in findings {
                    println!("✗ {}", finding);
                }
            }
            OutputFormat::Json => {
                let messages: Vec<String> = findings.iter().map(ToString::to_string).collect();
                print_json(&serde_json::json!({
                    "consistent": findings.is_empty(),
                    "findings": messages,
                }));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

fn status_label(book: &Book, holder: Option<ReaderId>) -> String {
    match (book.is_borrowed(), holder) {
        (true, Some(reader)) => format!("borrowed by reader {}", reader),
        (true, None) => "borrowed".to_string(),
        (false, _) => "available".to_string(),
    }
}

/// Multi-line description of a book
pub fn book_details(book: &Book, holder: Option<ReaderId>) -> String {
    format!(
        "ID:        {}\nTitle:     {}\nAuthor:    {}\nPublisher: {}\nStatus:    {}\n",
        book.id(),
        book.name(),
        book.author(),
        book.publisher(),
        status_label(book, holder)
    )
}

/// One-line summary of a book
pub fn book_line(book: &Book) -> String {
    let marker = if book.is_borrowed() { " [out]" } else { "" };
    format!(
        "{:>4}  {} - {} ({}){}",
        book.id(),
        truncate(book.name(), 40),
        truncate(book.author(), 24),
        truncate(book.publisher(), 24),
        marker
    )
}

/// Multi-line description of a reader
pub fn reader_details(reader: &Reader) -> String {
    let mut out = format!(
        "ID:        {}\nName:      {}\nContact:   {}\nBorrowed:  {} book(s)\n",
        reader.id(),
        reader.name(),
        reader.contact(),
        reader.borrowed_books().len()
    );
    if !reader.borrowed_books().is_empty() {
        out.push_str(&format!("Book IDs:  {}\n", join_ids(reader.borrowed_books())));
    }
    out
}

/// One-line summary of a reader
pub fn reader_line(reader: &Reader) -> String {
    let loans = match reader.borrowed_books().len() {
        0 => String::new(),
        n => format!(" [{}]", n),
    };
    format!(
        "{:>4}  {} <{}>{}",
        reader.id(),
        truncate(reader.name(), 40),
        truncate(reader.contact(), 32),
        loans
    )
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("图书管理系统图书管理系统", 5), "图书...");
    }

    #[test]
    fn test_book_details_status() {
        let mut book = Book::new(1, "Dune", "Herbert", "Ace");
        assert!(book_details(&book, None).contains("Status:    available"));

        book.set_borrowed(true);
        assert!(book_details(&book, Some(4)).contains("borrowed by reader 4"));
    }

    #[test]
    fn test_book_line() {
        let mut book = Book::new(12, "Dune", "Herbert", "Ace");
        assert_eq!(book_line(&book), "  12  Dune - Herbert (Ace)");

        book.set_borrowed(true);
        assert!(book_line(&book).ends_with("[out]"));
    }

    #[test]
    fn test_reader_details_lists_loans() {
        let mut reader = Reader::new(1, "Alice", "alice@x.com");
        assert!(!reader_details(&reader).contains("Book IDs"));

        reader.borrow_book(3);
        reader.borrow_book(1);
        assert!(reader_details(&reader).contains("Book IDs:  3, 1"));
        assert_eq!(reader_line(&reader), "   1  Alice <alice@x.com> [2]");
    }
}

//! Line-oriented record format
//!
//! Each entity is written as a fixed sequence of lines:
//!
//! ```text
//! Book                    Reader
//! ----                    ------
//! <id>                    <id>
//! <name>                  <name>
//! <author>                <contact>
//! <publisher>             <loan count>
//! <borrowed: 0 or 1>      <book id> <book id> ...
//! ```
//!
//! Book records are separated by a blank line; reader records only by the
//! newline ending their loan line. Text fields cannot hold line breaks, so
//! collections refuse them before anything is written.
//!
//! Decoding is token based: numbers skip any leading whitespace, while text
//! fields are taken verbatim up to the end of their line. Decoding a
//! collection stops at the first record that is malformed or cut short and
//! keeps everything read before it.

use std::str::FromStr;

use crate::models::{Book, BookId, Reader, MAX_ID};

/// An entity that can be stored in the line-oriented format
pub trait Record: Sized {
    /// Text placed between two consecutive records
    const SEPARATOR: &'static str;

    /// Append this record to `out`, without a trailing separator
    fn encode(&self, out: &mut String);

    /// Read one record, or `None` if the input does not hold a complete one
    fn decode(cursor: &mut RecordCursor<'_>) -> Option<Self>;
}

impl Record for Book {
    const SEPARATOR: &'static str = "\n\n";

    fn encode(&self, out: &mut String) {
        push_line(out, &self.id().to_string());
        push_line(out, self.name());
        push_line(out, self.author());
        push_line(out, self.publisher());
        out.push(if self.is_borrowed() { '1' } else { '0' });
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Option<Self> {
        let id = read_id(cursor)?;
        cursor.skip_line_break();
        let name = cursor.read_line()?;
        let author = cursor.read_line()?;
        let publisher = cursor.read_line()?;
        let borrowed = match cursor.read_number::<u8>()? {
            0 => false,
            1 => true,
            _ => return None,
        };

        let mut book = Book::new(id, name, author, publisher);
        book.set_borrowed(borrowed);
        Some(book)
    }
}

impl Record for Reader {
    const SEPARATOR: &'static str = "\n";

    fn encode(&self, out: &mut String) {
        push_line(out, &self.id().to_string());
        push_line(out, self.name());
        push_line(out, self.contact());
        push_line(out, &self.borrowed_books().len().to_string());
        let ids: Vec<String> = self
            .borrowed_books()
            .iter()
            .map(ToString::to_string)
            .collect();
        out.push_str(&ids.join(" "));
    }

    fn decode(cursor: &mut RecordCursor<'_>) -> Option<Self> {
        let id = read_id(cursor)?;
        cursor.skip_line_break();
        let name = cursor.read_line()?;
        let contact = cursor.read_line()?;
        let count: usize = cursor.read_number()?;

        // The count comes from the file, so it is not trusted for allocation
        let mut borrowed = Vec::new();
        for _ in 0..count {
            borrowed.push(cursor.read_number::<BookId>()?);
        }

        // Repeated ids collapse to one loan
        Some(Reader::with_loans(id, name, contact, borrowed))
    }
}

/// Read a record id; ids above `MAX_ID` make the record malformed
fn read_id(cursor: &mut RecordCursor<'_>) -> Option<u32> {
    cursor.read_number().filter(|id| *id <= MAX_ID)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Encode a whole collection, records in order
///
/// Non-empty output always ends with a newline.
pub fn encode_all<T: Record>(records: &[T]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push_str(T::SEPARATOR);
        }
        record.encode(&mut out);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Result of decoding a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Records read before the end of input or the first bad record
    pub records: Vec<T>,
    /// Byte offset of the first record that could not be decoded
    pub stopped_at: Option<usize>,
}

impl<T> Decoded<T> {
    /// Whether decoding ended early on a malformed record
    pub fn is_truncated(&self) -> bool {
        self.stopped_at.is_some()
    }
}

/// Decode records until the input runs out or a record is malformed
pub fn decode_all<T: Record>(input: &str) -> Decoded<T> {
    let mut cursor = RecordCursor::new(input);
    let mut records = Vec::new();

    loop {
        cursor.skip_whitespace();
        if cursor.is_at_end() {
            return Decoded {
                records,
                stopped_at: None,
            };
        }

        let start = cursor.position();
        match T::decode(&mut cursor) {
            Some(record) => records.push(record),
            None => {
                return Decoded {
                    records,
                    stopped_at: Some(start),
                }
            }
        }
    }
}

/// Read position within a record file
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Skip spaces, tabs and line breaks
    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Read an unsigned decimal number, skipping leading whitespace
    ///
    /// Stops at the first non-digit. Fails if there are no digits or the
    /// value does not fit in `T`.
    pub fn read_number<T: FromStr>(&mut self) -> Option<T> {
        self.skip_whitespace();
        let rest = self.rest();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let value = rest[..digits].parse().ok()?;
        self.pos += digits;
        Some(value)
    }

    /// Consume the line break that ends a number line
    ///
    /// Only one break is consumed, so a following empty text field is
    /// preserved.
    pub fn skip_line_break(&mut self) {
        let rest = self.rest();
        if rest.starts_with("\r\n") {
            self.pos += 2;
        } else if let Some(c) = rest.chars().next() {
            self.pos += c.len_utf8();
        }
    }

    /// Read the rest of the current line, without its line ending
    ///
    /// Returns `None` only when no input is left at all. A final line
    /// without a newline is still returned.
    pub fn read_line(&mut self) -> Option<String> {
        if self.is_at_end() {
            return None;
        }
        let rest = self.rest();
        let (line, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Some(line.strip_suffix('\r').unwrap_or(line).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lent(mut book: Book) -> Book {
        book.set_borrowed(true);
        book
    }

    #[test]
    fn test_book_record_layout() {
        let books = vec![
            Book::new(1, "Dune", "Herbert", "Ace"),
            lent(Book::new(2, "Emma", "Austen", "Murray")),
        ];

        let text = encode_all(&books);
        assert_eq!(
            text,
            "1\nDune\nHerbert\nAce\n0\n\n2\nEmma\nAusten\nMurray\n1\n"
        );
    }

    #[test]
    fn test_reader_record_layout() {
        let mut alice = Reader::new(1, "Alice", "alice@x.com");
        alice.borrow_book(3);
        alice.borrow_book(1);
        let bob = Reader::new(2, "Bob", "555-0100");

        let text = encode_all(&[alice, bob]);
        assert_eq!(
            text,
            "1\nAlice\nalice@x.com\n2\n3 1\n2\nBob\n555-0100\n0\n\n"
        );
    }

    #[test]
    fn test_empty_collection_encodes_to_nothing() {
        assert_eq!(encode_all::<Book>(&[]), "");
        let decoded = decode_all::<Book>("");
        assert!(decoded.records.is_empty());
        assert!(!decoded.is_truncated());
    }

    #[test]
    fn test_books_round_trip() {
        let books = vec![
            Book::new(1, "Dune", "Herbert", "Ace"),
            lent(Book::new(4, "", "  padded  ", "Penguin")),
            Book::new(9, "Dune", "Herbert", "Ace"),
        ];

        let decoded = decode_all::<Book>(&encode_all(&books));
        assert_eq!(decoded.records, books);
        assert!(!decoded.is_truncated());
    }

    #[test]
    fn test_readers_round_trip() {
        let mut alice = Reader::new(1, "Alice", "alice@x.com");
        alice.borrow_book(7);
        alice.borrow_book(2);
        let bob = Reader::new(3, "Bob", "");
        let readers = vec![alice, bob];

        let decoded = decode_all::<Reader>(&encode_all(&readers));
        assert_eq!(decoded.records, readers);
        assert!(!decoded.is_truncated());
    }

    #[test]
    fn test_truncated_third_book_is_dropped() {
        let text = "1\nDune\nHerbert\nAce\n0\n\n2\nEmma\nAusten\nMurray\n1\n\n3\nUlysses\nJoyce\n";

        let decoded = decode_all::<Book>(text);
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.records[0].name(), "Dune");
        assert_eq!(decoded.records[1].name(), "Emma");
        assert!(decoded.records[1].is_borrowed());
        assert!(decoded.is_truncated());
    }

    #[test]
    fn test_legacy_layout_without_blank_lines() {
        // Older files separate books with a single newline and have no
        // trailing newline
        let text = "1\nDune\nHerbert\nAce\n0\n2\nEmma\nAusten\nMurray\n1";

        let decoded = decode_all::<Book>(text);
        assert_eq!(decoded.records.len(), 2);
        assert!(!decoded.is_truncated());
    }

    #[test]
    fn test_bad_borrowed_flag_stops_decoding() {
        let text = "1\nDune\nHerbert\nAce\n0\n\n2\nEmma\nAusten\nMurray\n2\n";

        let decoded = decode_all::<Book>(text);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.stopped_at, Some(text.find("2\nEmma").unwrap()));
    }

    #[test]
    fn test_non_numeric_id_stops_decoding() {
        let decoded = decode_all::<Reader>("abc\nAlice\nalice\n0\n");
        assert!(decoded.records.is_empty());
        assert_eq!(decoded.stopped_at, Some(0));
    }

    #[test]
    fn test_reader_with_missing_loan_ids() {
        let text = "1\nAlice\nalice@x.com\n1\n4\n2\nBob\nbob@x.com\n3\n1 2";

        let decoded = decode_all::<Reader>(text);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].borrowed_books(), &[4]);
        assert!(decoded.is_truncated());
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "1\r\nDune\r\nHerbert\r\nAce\r\n1\r\n";

        let decoded = decode_all::<Book>(text);
        assert_eq!(decoded.records.len(), 1);
        let book = &decoded.records[0];
        assert_eq!(book.name(), "Dune");
        assert_eq!(book.publisher(), "Ace");
        assert!(book.is_borrowed());
    }

    #[test]
    fn test_repeated_loan_ids_load_once() {
        let decoded = decode_all::<Reader>("1\nAlice\na\n3\n1 4 1\n");
        assert!(!decoded.is_truncated());
        assert_eq!(decoded.records[0].borrowed_books(), &[1, 4]);
    }

    #[test]
    fn test_id_above_max_is_malformed() {
        let text = format!("1\nDune\nHerbert\nAce\n0\n\n{}\nX\nY\nZ\n0\n", u32::MAX);

        let decoded = decode_all::<Book>(&text);
        assert_eq!(decoded.records.len(), 1);
        assert!(decoded.is_truncated());

        let highest = format!("{}\nX\nY\nZ\n0\n", MAX_ID);
        assert_eq!(decode_all::<Book>(&highest).records[0].id(), MAX_ID);
    }

    #[test]
    fn test_cursor_read_line_at_end() {
        let mut cursor = RecordCursor::new("last");
        assert_eq!(cursor.read_line(), Some("last".to_string()));
        assert_eq!(cursor.read_line(), None);
    }

    #[test]
    fn test_cursor_number_overflow() {
        let mut cursor = RecordCursor::new("99999999999");
        assert_eq!(cursor.read_number::<u32>(), None);
        assert_eq!(cursor.position(), 0);
    }
}

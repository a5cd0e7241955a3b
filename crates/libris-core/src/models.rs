//! Data models for Libris
//!
//! Defines the two entities: `Book` and `Reader`.
//!
//! Cross-entity references are plain identifiers. A reader records the ids
//! of the books it holds, and a book only carries a borrowed flag. Keeping
//! the two in agreement is the job of the lending coordinator.

use serde::{Deserialize, Serialize};

/// Identifier of a book in the catalog
pub type BookId = u32;

/// Identifier of a reader in the membership store
pub type ReaderId = u32;

/// Highest id a collection hands out or accepts from a record file
pub const MAX_ID: u32 = u32::MAX - 1;

/// A book in the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    name: String,
    author: String,
    publisher: String,
    borrowed: bool,
}

impl Book {
    /// Create an available book with the given id and details
    pub fn new(
        id: BookId,
        name: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            author: author.into(),
            publisher: publisher.into(),
            borrowed: false,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    /// The book title
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Whether the book is currently lent out
    pub fn is_borrowed(&self) -> bool {
        self.borrowed
    }

    pub fn set_id(&mut self, id: BookId) {
        self.id = id;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_publisher(&mut self, publisher: impl Into<String>) {
        self.publisher = publisher.into();
    }

    pub fn set_borrowed(&mut self, borrowed: bool) {
        self.borrowed = borrowed;
    }

    /// Apply a partial update, leaving the borrowed flag alone
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(publisher) = patch.publisher {
            self.publisher = publisher;
        }
    }
}

/// Fields to replace on an existing book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl BookPatch {
    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.author.is_none() && self.publisher.is_none()
    }
}

/// A library member
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reader {
    id: ReaderId,
    name: String,
    contact: String,
    /// Ids of held books, in the order they were borrowed
    borrowed: Vec<BookId>,
}

impl Reader {
    /// Create a reader with no loans
    pub fn new(id: ReaderId, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            contact: contact.into(),
            borrowed: Vec::new(),
        }
    }

    pub fn id(&self) -> ReaderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// The borrowed-set, in borrow order
    pub fn borrowed_books(&self) -> &[BookId] {
        &self.borrowed
    }

    /// Check whether this reader holds the given book
    pub fn holds(&self, book_id: BookId) -> bool {
        self.borrowed.contains(&book_id)
    }

    pub fn set_id(&mut self, id: ReaderId) {
        self.id = id;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_contact(&mut self, contact: impl Into<String>) {
        self.contact = contact.into();
    }

    /// Record a loan. Returns false if the book is already held.
    pub fn borrow_book(&mut self, book_id: BookId) -> bool {
        if self.holds(book_id) {
            return false;
        }
        self.borrowed.push(book_id);
        true
    }

    /// Drop a loan. Returns false if the book was not held.
    pub fn return_book(&mut self, book_id: BookId) -> bool {
        match self.borrowed.iter().position(|&id| id == book_id) {
            Some(pos) => {
                self.borrowed.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Apply a partial update, leaving the borrowed-set alone
    pub fn apply(&mut self, patch: ReaderPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
    }

    /// Rebuild a reader from stored fields (used by the record decoder)
    ///
    /// Repeated book ids keep only their first occurrence.
    pub(crate) fn with_loans(
        id: ReaderId,
        name: String,
        contact: String,
        loans: Vec<BookId>,
    ) -> Self {
        let mut reader = Self::new(id, name, contact);
        for book_id in loans {
            reader.borrow_book(book_id);
        }
        reader
    }
}

/// Fields to replace on an existing reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderPatch {
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl ReaderPatch {
    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.contact.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_default() {
        let book = Book::default();
        assert_eq!(book.id(), 0);
        assert!(book.name().is_empty());
        assert!(book.author().is_empty());
        assert!(book.publisher().is_empty());
        assert!(!book.is_borrowed());
    }

    #[test]
    fn test_book_new_is_available() {
        let book = Book::new(7, "Dune", "Herbert", "Ace");
        assert_eq!(book.id(), 7);
        assert_eq!(book.name(), "Dune");
        assert_eq!(book.author(), "Herbert");
        assert_eq!(book.publisher(), "Ace");
        assert!(!book.is_borrowed());
    }

    #[test]
    fn test_book_setters() {
        let mut book = Book::default();
        book.set_id(3);
        book.set_name("Emma");
        book.set_author("Austen");
        book.set_publisher("Murray");
        book.set_borrowed(true);

        assert_eq!(book, {
            let mut expected = Book::new(3, "Emma", "Austen", "Murray");
            expected.set_borrowed(true);
            expected
        });
    }

    #[test]
    fn test_book_patch_keeps_flag() {
        let mut book = Book::new(1, "Dune", "Herbert", "Ace");
        book.set_borrowed(true);

        book.apply(BookPatch {
            author: Some("Frank Herbert".to_string()),
            ..Default::default()
        });

        assert_eq!(book.name(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert!(book.is_borrowed());
    }

    #[test]
    fn test_reader_default() {
        let reader = Reader::default();
        assert_eq!(reader.id(), 0);
        assert!(reader.name().is_empty());
        assert!(reader.contact().is_empty());
        assert!(reader.borrowed_books().is_empty());
    }

    #[test]
    fn test_reader_borrow_rejects_duplicates() {
        let mut reader = Reader::new(1, "Alice", "alice@x.com");
        assert!(reader.borrow_book(4));
        assert!(reader.borrow_book(2));
        assert!(!reader.borrow_book(4));
        assert_eq!(reader.borrowed_books(), &[4, 2]);
    }

    #[test]
    fn test_with_loans_drops_repeated_ids() {
        let reader = Reader::with_loans(1, "Alice".into(), "a".into(), vec![3, 1, 3, 1, 5]);
        assert_eq!(reader.borrowed_books(), &[3, 1, 5]);
    }

    #[test]
    fn test_reader_return_preserves_order() {
        let mut reader = Reader::new(1, "Alice", "alice@x.com");
        reader.borrow_book(1);
        reader.borrow_book(2);
        reader.borrow_book(3);

        assert!(reader.return_book(2));
        assert!(!reader.return_book(2));
        assert_eq!(reader.borrowed_books(), &[1, 3]);
    }

    #[test]
    fn test_reader_patch_keeps_loans() {
        let mut reader = Reader::new(1, "Alice", "alice@x.com");
        reader.borrow_book(9);

        reader.apply(ReaderPatch {
            contact: Some("alice@y.org".to_string()),
            ..Default::default()
        });

        assert_eq!(reader.name(), "Alice");
        assert_eq!(reader.contact(), "alice@y.org");
        assert!(reader.holds(9));
    }

    #[test]
    fn test_empty_patches() {
        assert!(BookPatch::default().is_empty());
        assert!(ReaderPatch::default().is_empty());
        assert!(!ReaderPatch {
            name: Some(String::new()),
            contact: None
        }
        .is_empty());
    }

    #[test]
    fn test_reader_serialization() {
        let mut reader = Reader::new(2, "Bob", "555-0100");
        reader.borrow_book(5);
        let json = serde_json::to_string(&reader).unwrap();
        let deserialized: Reader = serde_json::from_str(&json).unwrap();
        assert_eq!(reader, deserialized);
    }
}

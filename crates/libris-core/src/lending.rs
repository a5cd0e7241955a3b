//! Lending coordinator
//!
//! Borrowing and returning touch both stores: the reader's borrowed-set and
//! the book's borrowed flag. `Lending` is the only place that changes the
//! two together. It holds no state of its own, only mutable borrows of the
//! Catalog and the Membership store for the length of one operation.
//!
//! Per book the state machine is:
//!
//! ```text
//! Available --borrow--> Borrowed
//! Borrowed  --return--> Available
//! ```
//!
//! Both stores are rewritten after every successful transition.

use std::fmt;

use tracing::{info, warn};

use crate::collection::{Catalog, Membership};
use crate::error::{LibraryError, LibraryResult};
use crate::models::{BookId, ReaderId};

/// Coordinates a borrow or return across the two stores
pub struct Lending<'a> {
    catalog: &'a mut Catalog,
    members: &'a mut Membership,
}

impl<'a> Lending<'a> {
    pub fn new(catalog: &'a mut Catalog, members: &'a mut Membership) -> Self {
        Self { catalog, members }
    }

    /// Lend `book_id` to `reader_id`
    pub fn borrow(&mut self, reader_id: ReaderId, book_id: BookId) -> LibraryResult<()> {
        let reader = self
            .members
            .find(reader_id)
            .ok_or(LibraryError::ReaderNotFound(reader_id))?;
        let book = self
            .catalog
            .find(book_id)
            .ok_or(LibraryError::BookNotFound(book_id))?;

        if book.is_borrowed() {
            return Err(LibraryError::AlreadyBorrowed(book_id));
        }
        if reader.holds(book_id) {
            warn!(
                "Reader {} lists book {} but the book is marked available",
                reader_id, book_id
            );
            return Err(LibraryError::DuplicateBorrow {
                reader: reader_id,
                book: book_id,
            });
        }

        self.set_loan(reader_id, book_id, true);
        info!("Book {} lent to reader {}", book_id, reader_id);
        Ok(())
    }

    /// Take `book_id` back from `reader_id`
    pub fn return_book(&mut self, reader_id: ReaderId, book_id: BookId) -> LibraryResult<()> {
        let reader = self
            .members
            .find(reader_id)
            .ok_or(LibraryError::ReaderNotFound(reader_id))?;
        let book = self
            .catalog
            .find(book_id)
            .ok_or(LibraryError::BookNotFound(book_id))?;

        if !book.is_borrowed() {
            return Err(LibraryError::NotBorrowed(book_id));
        }
        if !reader.holds(book_id) {
            return Err(LibraryError::NotBorrowedByReader {
                reader: reader_id,
                book: book_id,
            });
        }

        self.set_loan(reader_id, book_id, false);
        info!("Book {} returned by reader {}", book_id, reader_id);
        Ok(())
    }

    /// Apply one transition to both records, then persist books and readers
    ///
    /// Callers have already checked both ids exist.
    fn set_loan(&mut self, reader_id: ReaderId, book_id: BookId, lent: bool) {
        if let Some(reader) = self.members.find_mut(reader_id) {
            if lent {
                reader.borrow_book(book_id);
            } else {
                reader.return_book(book_id);
            }
        }
        if let Some(book) = self.catalog.find_mut(book_id) {
            book.set_borrowed(lent);
        }

        self.catalog.persist();
        self.members.persist();
    }
}

/// A disagreement between book flags and reader borrowed-sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// The book is flagged borrowed but no reader holds it
    Unheld { book: BookId },
    /// More than one reader holds the same book
    MultipleHolders { book: BookId, readers: Vec<ReaderId> },
    /// A reader holds a book that is flagged available
    HeldButAvailable { book: BookId, reader: ReaderId },
    /// A reader holds an id that is not in the catalog
    UnknownBook { book: BookId, reader: ReaderId },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::Unheld { book } => {
                write!(f, "book {} is marked borrowed but no reader holds it", book)
            }
            Inconsistency::MultipleHolders { book, readers } => {
                let ids: Vec<String> = readers.iter().map(ToString::to_string).collect();
                write!(f, "book {} is held by readers {}", book, ids.join(", "))
            }
            Inconsistency::HeldButAvailable { book, reader } => write!(
                f,
                "reader {} holds book {} which is marked available",
                reader, book
            ),
            Inconsistency::UnknownBook { book, reader } => write!(
                f,
                "reader {} holds book {} which is not in the catalog",
                reader, book
            ),
        }
    }
}

/// Check that every borrowed flag matches exactly one holder
///
/// Findings are listed book by book in catalog order, followed by
/// references to books missing from the catalog.
pub fn audit(catalog: &Catalog, members: &Membership) -> Vec<Inconsistency> {
    let mut findings = Vec::new();

    for book in catalog.all() {
        let holders: Vec<ReaderId> = members
            .all()
            .iter()
            .filter(|r| r.holds(book.id()))
            .map(|r| r.id())
            .collect();

        match (book.is_borrowed(), holders.len()) {
            (true, 0) => findings.push(Inconsistency::Unheld { book: book.id() }),
            (_, n) if n > 1 => findings.push(Inconsistency::MultipleHolders {
                book: book.id(),
                readers: holders,
            }),
            (false, 1) => findings.push(Inconsistency::HeldButAvailable {
                book: book.id(),
                reader: holders[0],
            }),
            _ => {}
        }
    }

    for reader in members.all() {
        for &book in reader.borrowed_books() {
            if catalog.find(book).is_none() {
                findings.push(Inconsistency::UnknownBook {
                    book,
                    reader: reader.id(),
                });
            }
        }
    }

    findings
}

//! Operation errors
//!
//! Every catalog, membership or lending operation that can be refused
//! reports why through `LibraryError`. Storage failures are not part of
//! this type: a failed save is logged and the in-memory change stands.

use thiserror::Error;

use crate::models::{BookId, ReaderId};

/// Broad classification of a refused operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An id references no record
    NotFound,
    /// The operation is not allowed in the record's current state
    InvalidState,
    /// The book flag and the reader's borrowed-set disagree
    InconsistentState,
    /// A value cannot be stored as given
    InvalidInput,
}

/// Reasons an operation was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Reader {0} not found")]
    ReaderNotFound(ReaderId),

    #[error("Book {0} is already borrowed")]
    AlreadyBorrowed(BookId),

    #[error("Book {0} is not borrowed")]
    NotBorrowed(BookId),

    #[error("Reader {reader} has not borrowed book {book}")]
    NotBorrowedByReader { reader: ReaderId, book: BookId },

    /// The reader already lists a book whose flag says it is available
    #[error("Reader {reader} already lists book {book} although it is marked available")]
    DuplicateBorrow { reader: ReaderId, book: BookId },

    #[error("Book {book} is on loan to reader {reader} and cannot be removed")]
    BookOnLoan { book: BookId, reader: ReaderId },

    #[error("Reader {reader} still holds {count} book(s) and cannot be removed")]
    ReaderHasLoans { reader: ReaderId, count: usize },

    #[error("The {field} must be a single line")]
    LineBreakInField { field: &'static str },

    #[error("No ids left to assign")]
    IdsExhausted,
}

impl LibraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::BookNotFound(_) | LibraryError::ReaderNotFound(_) => ErrorKind::NotFound,
            LibraryError::AlreadyBorrowed(_)
            | LibraryError::NotBorrowed(_)
            | LibraryError::NotBorrowedByReader { .. }
            | LibraryError::BookOnLoan { .. }
            | LibraryError::ReaderHasLoans { .. } => ErrorKind::InvalidState,
            LibraryError::DuplicateBorrow { .. } => ErrorKind::InconsistentState,
            LibraryError::LineBreakInField { .. } | LibraryError::IdsExhausted => {
                ErrorKind::InvalidInput
            }
        }
    }
}

/// Result type for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(LibraryError::BookNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(LibraryError::ReaderNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(LibraryError::AlreadyBorrowed(1).kind(), ErrorKind::InvalidState);
        assert_eq!(
            LibraryError::NotBorrowedByReader { reader: 1, book: 2 }.kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            LibraryError::DuplicateBorrow { reader: 1, book: 2 }.kind(),
            ErrorKind::InconsistentState
        );
        assert_eq!(
            LibraryError::LineBreakInField { field: "title" }.kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_display() {
        let err = LibraryError::BookOnLoan { book: 3, reader: 5 };
        let msg = err.to_string();
        assert!(msg.contains("Book 3"));
        assert!(msg.contains("reader 5"));
    }
}

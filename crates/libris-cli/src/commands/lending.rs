//! Borrow and return handlers

use anyhow::{Context, Result};

use libris_core::{BookId, Library, ReaderId};

use crate::output::Output;

/// Lend a book to a reader
pub fn borrow(library: &mut Library, reader: ReaderId, book: BookId, output: &Output) -> Result<()> {
    library
        .borrow(reader, book)
        .with_context(|| format!("Reader {} could not borrow book {}", reader, book))?;

    output.success(&format!("Book {} lent to reader {}", book, reader));
    Ok(())
}

/// Take a book back
pub fn return_book(
    library: &mut Library,
    reader: ReaderId,
    book: BookId,
    output: &Output,
) -> Result<()> {
    library
        .return_book(reader, book)
        .with_context(|| format!("Reader {} could not return book {}", reader, book))?;

    output.success(&format!("Book {} returned by reader {}", book, reader));
    Ok(())
}

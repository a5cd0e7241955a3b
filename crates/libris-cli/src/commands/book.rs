//! Book command handlers

use anyhow::{anyhow, bail, Context, Result};

use libris_core::{Book, BookId, BookPatch, Library};

use crate::output::Output;
use crate::prompt::confirm;

/// Add a new book
pub fn add(
    library: &mut Library,
    title: String,
    author: String,
    publisher: String,
    output: &Output,
) -> Result<()> {
    let id = library
        .add_book(title, author, publisher)
        .context("Failed to add book")?;
    output.success(&format!("Added book: {}", id));
    if let Some(book) = library.find_book(id) {
        output.print_book(book, None);
    }
    Ok(())
}

/// List all books
pub fn list(library: &Library, output: &Output) -> Result<()> {
    let books: Vec<&Book> = library.books().iter().collect();
    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show(library: &Library, id: BookId, output: &Output) -> Result<()> {
    let book = library
        .find_book(id)
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    output.print_book(book, library.holder_of(id));
    Ok(())
}

/// Search title, author and publisher
pub fn search(library: &Library, keyword: String, output: &Output) -> Result<()> {
    let books = library.search_books(&keyword);
    output.print_books(&books);
    Ok(())
}

/// Change some of a book's details
pub fn edit(library: &mut Library, id: BookId, patch: BookPatch, output: &Output) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass --title, --author or --publisher.");
    }

    library
        .update_book(id, patch)
        .with_context(|| format!("Failed to update book {}", id))?;

    output.success("Book updated");
    show(library, id, output)
}

/// Remove a book
pub fn remove(library: &mut Library, id: BookId, yes: bool, output: &Output) -> Result<()> {
    let book = library
        .find_book(id)
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!("Remove book: {} - {}", book.id(), book.name());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = library
        .remove_book(id)
        .with_context(|| format!("Failed to remove book {}", id))?;

    output.success(&format!("Removed book: {} - {}", removed.id(), removed.name()));
    Ok(())
}

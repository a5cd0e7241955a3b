//! Interactive menu
//!
//! The numbered-menu front-end: lend/return, book management, reader
//! management, exit. It only collects input and calls `Library`; every
//! rule lives in the core crate. End of input behaves like choosing exit.

use anyhow::Result;
use std::io::{BufRead, Write};

use libris_core::Library;

use crate::output::{book_details, book_line, reader_details, reader_line};
use crate::prompt::Prompter;

const RULE: &str = "=======================================";

/// What the user picked in a menu
enum Choice {
    Option(u32),
    Invalid,
    EndOfInput,
}

/// One interactive session over a library
pub struct Menu<'a, R, W> {
    library: &'a mut Library,
    io: Prompter<R, W>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(library: &'a mut Library, io: Prompter<R, W>) -> Self {
        Self { library, io }
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.header("Library Management")?;
            self.options(&["1. Borrow / return", "2. Books", "3. Readers", "0. Exit"])?;

            match self.choose()? {
                Choice::Option(1) => {
                    if !self.lending_menu()? {
                        break;
                    }
                }
                Choice::Option(2) => {
                    if !self.book_menu()? {
                        break;
                    }
                }
                Choice::Option(3) => {
                    if !self.reader_menu()? {
                        break;
                    }
                }
                Choice::Option(0) | Choice::EndOfInput => break,
                Choice::Option(_) | Choice::Invalid => self.invalid()?,
            }
        }

        writeln!(self.io.out(), "Goodbye!")?;
        Ok(())
    }

    /// Returns false when input ran out
    fn lending_menu(&mut self) -> Result<bool> {
        loop {
            self.header("Borrow / Return")?;
            self.options(&["1. Borrow a book", "2. Return a book", "0. Back"])?;

            match self.choose()? {
                Choice::Option(choice @ (1 | 2)) => {
                    let Some(reader_id) = self.io.number("Reader ID: ")? else {
                        return Ok(false);
                    };
                    let Some(book_id) = self.io.number("Book ID: ")? else {
                        return Ok(false);
                    };

                    let (result, done) = if choice == 1 {
                        (self.library.borrow(reader_id, book_id), "Book borrowed.")
                    } else {
                        (self.library.return_book(reader_id, book_id), "Book returned.")
                    };
                    match result {
                        Ok(()) => writeln!(self.io.out(), "{}", done)?,
                        Err(e) => writeln!(self.io.out(), "Failed: {}", e)?,
                    }
                }
                Choice::Option(0) => return Ok(true),
                Choice::EndOfInput => return Ok(false),
                Choice::Option(_) | Choice::Invalid => self.invalid()?,
            }
        }
    }

    /// Returns false when input ran out
    fn book_menu(&mut self) -> Result<bool> {
        loop {
            self.header("Books")?;
            self.options(&[
                "1. Add book",
                "2. Remove book",
                "3. Find book by ID",
                "4. Search books",
                "5. List all books",
                "0. Back",
            ])?;

            match self.choose()? {
                Choice::Option(1) => {
                    let Some(name) = self.io.line("Title: ")? else {
                        return Ok(false);
                    };
                    let Some(author) = self.io.line("Author: ")? else {
                        return Ok(false);
                    };
                    let Some(publisher) = self.io.line("Publisher: ")? else {
                        return Ok(false);
                    };
                    match self.library.add_book(name, author, publisher) {
                        Ok(id) => writeln!(self.io.out(), "Book added with ID {}.", id)?,
                        Err(e) => writeln!(self.io.out(), "Failed: {}", e)?,
                    }
                }
                Choice::Option(2) => {
                    let Some(id) = self.io.number("Book ID to remove: ")? else {
                        return Ok(false);
                    };
                    match self.library.remove_book(id) {
                        Ok(book) => writeln!(self.io.out(), "Removed \"{}\".", book.name())?,
                        Err(e) => writeln!(self.io.out(), "Failed: {}", e)?,
                    }
                }
                Choice::Option(3) => {
                    let Some(id) = self.io.number("Book ID: ")? else {
                        return Ok(false);
                    };
                    match self.library.find_book(id) {
                        Some(book) => {
                            let holder = self.library.holder_of(id).map(|r| r.id());
                            let text = book_details(book, holder);
                            write!(self.io.out(), "{}", text)?;
                        }
                        None => writeln!(self.io.out(), "No book with ID {}.", id)?,
                    }
                }
                Choice::Option(4) => {
                    let Some(keyword) = self.io.line("Keyword: ")? else {
                        return Ok(false);
                    };
                    let lines: Vec<String> = self
                        .library
                        .search_books(&keyword)
                        .into_iter()
                        .map(book_line)
                        .collect();
                    self.listing(&lines, "book(s) found", "No matching books.")?;
                }
                Choice::Option(5) => {
                    let lines: Vec<String> = self.library.books().iter().map(book_line).collect();
                    self.listing(&lines, "book(s) in the catalog", "The catalog is empty.")?;
                }
                Choice::Option(0) => return Ok(true),
                Choice::EndOfInput => return Ok(false),
                Choice::Option(_) | Choice::Invalid => self.invalid()?,
            }
        }
    }

    /// Returns false when input ran out
    fn reader_menu(&mut self) -> Result<bool> {
        loop {
            self.header("Readers")?;
            self.options(&[
                "1. Add reader",
                "2. Remove reader",
                "3. Find reader by ID",
                "4. Search readers",
                "5. List all readers",
                "0. Back",
            ])?;

            match self.choose()? {
                Choice::Option(1) => {
                    let Some(name) = self.io.line("Name: ")? else {
                        return Ok(false);
                    };
                    let Some(contact) = self.io.line("Contact: ")? else {
                        return Ok(false);
                    };
                    match self.library.add_reader(name, contact) {
                        Ok(id) => writeln!(self.io.out(), "Reader added with ID {}.", id)?,
                        Err(e) => writeln!(self.io.out(), "Failed: {}", e)?,
                    }
                }
                Choice::Option(2) => {
                    let Some(id) = self.io.number("Reader ID to remove: ")? else {
                        return Ok(false);
                    };
                    match self.library.remove_reader(id) {
                        Ok(reader) => writeln!(self.io.out(), "Removed {}.", reader.name())?,
                        Err(e) => writeln!(self.io.out(), "Failed: {}", e)?,
                    }
                }
                Choice::Option(3) => {
                    let Some(id) = self.io.number("Reader ID: ")? else {
                        return Ok(false);
                    };
                    match self.library.find_reader(id) {
                        Some(reader) => {
                            let text = reader_details(reader);
                            write!(self.io.out(), "{}", text)?;
                        }
                        None => writeln!(self.io.out(), "No reader with ID {}.", id)?,
                    }
                }
                Choice::Option(4) => {
                    let Some(keyword) = self.io.line("Keyword: ")? else {
                        return Ok(false);
                    };
                    let lines: Vec<String> = self
                        .library
                        .search_readers(&keyword)
                        .into_iter()
                        .map(reader_line)
                        .collect();
                    self.listing(&lines, "reader(s) found", "No matching readers.")?;
                }
                Choice::Option(5) => {
                    let lines: Vec<String> =
                        self.library.readers().iter().map(reader_line).collect();
                    self.listing(&lines, "reader(s) registered", "There are no readers.")?;
                }
                Choice::Option(0) => return Ok(true),
                Choice::EndOfInput => return Ok(false),
                Choice::Option(_) | Choice::Invalid => self.invalid()?,
            }
        }
    }

    fn header(&mut self, title: &str) -> Result<()> {
        writeln!(self.io.out())?;
        writeln!(self.io.out(), "== {} ==", title)?;
        Ok(())
    }

    fn options(&mut self, items: &[&str]) -> Result<()> {
        for item in items {
            writeln!(self.io.out(), "{}", item)?;
        }
        Ok(())
    }

    fn choose(&mut self) -> Result<Choice> {
        Ok(match self.io.line("Choice: ")? {
            None => Choice::EndOfInput,
            Some(line) => match line.trim().parse() {
                Ok(n) => Choice::Option(n),
                Err(_) => Choice::Invalid,
            },
        })
    }

    fn invalid(&mut self) -> Result<()> {
        writeln!(self.io.out(), "Invalid choice, please try again.")?;
        Ok(())
    }

    fn listing(&mut self, lines: &[String], summary: &str, empty: &str) -> Result<()> {
        if lines.is_empty() {
            writeln!(self.io.out(), "{}", empty)?;
            return Ok(());
        }
        writeln!(self.io.out(), "{} {}", lines.len(), summary)?;
        writeln!(self.io.out(), "{}", RULE)?;
        for line in lines {
            writeln!(self.io.out(), "{}", line)?;
        }
        writeln!(self.io.out(), "{}", RULE)?;
        Ok(())
    }
}

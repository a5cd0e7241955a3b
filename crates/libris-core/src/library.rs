//! Library facade
//!
//! `Library` owns one Catalog and one Membership store and is the entry
//! point for every operation the front-end needs:
//!
//! ```ignore
//! let mut library = Library::open()?;
//!
//! let book = library.add_book("Dune", "Herbert", "Ace")?;
//! let reader = library.add_reader("Alice", "alice@x.com")?;
//! library.borrow(reader, book)?;
//!
//! library.close()?;
//! ```
//!
//! Every mutation rewrites the affected record file before returning.
//! `close` rewrites both files once more.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::collection::{Catalog, Membership};
use crate::config::Config;
use crate::error::LibraryResult;
use crate::lending::{self, Inconsistency, Lending};
use crate::models::{Book, BookId, BookPatch, Reader, ReaderId, ReaderPatch};
use crate::storage::{RecordFile, StorageResult};

/// Summary counts for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub books: usize,
    pub borrowed: usize,
    pub readers: usize,
    pub next_book_id: BookId,
    pub next_reader_id: ReaderId,
}

impl LibraryStats {
    /// Books on the shelf
    pub fn available(&self) -> usize {
        self.books - self.borrowed
    }
}

/// The catalog and membership of one library
pub struct Library {
    catalog: Catalog,
    members: Membership,
    config: Config,
}

impl Library {
    /// Open the library using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the library with a specific configuration
    ///
    /// Missing record files give empty collections; nothing is written
    /// until the first change.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let catalog = Catalog::open(RecordFile::new(config.books_path()))
            .context("Failed to load books")?;
        let members = Membership::open(RecordFile::new(config.readers_path()))
            .context("Failed to load readers")?;

        debug!(
            "Opened library with {} book(s) and {} reader(s)",
            catalog.len(),
            members.len()
        );

        let library = Self {
            catalog,
            members,
            config,
        };
        for finding in library.audit() {
            warn!("Inconsistent loan records: {}", finding);
        }
        Ok(library)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The book collection
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The reader collection
    pub fn members(&self) -> &Membership {
        &self.members
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            books: self.catalog.len(),
            borrowed: self.catalog.borrowed_count(),
            readers: self.members.len(),
            next_book_id: self.catalog.next_id(),
            next_reader_id: self.members.next_id(),
        }
    }

    // ==================== Book Operations ====================

    /// Add a book and return its id
    pub fn add_book(
        &mut self,
        name: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
    ) -> LibraryResult<BookId> {
        self.catalog.add(name, author, publisher)
    }

    /// Remove a book no reader holds
    pub fn remove_book(&mut self, id: BookId) -> LibraryResult<Book> {
        self.catalog.remove(id, &self.members)
    }

    /// Get a book by id
    pub fn find_book(&self, id: BookId) -> Option<&Book> {
        self.catalog.find(id)
    }

    /// Search title, author and publisher
    pub fn search_books(&self, keyword: &str) -> Vec<&Book> {
        self.catalog.search(keyword)
    }

    /// All books in catalog order
    pub fn books(&self) -> &[Book] {
        self.catalog.all()
    }

    /// Change a book's details
    pub fn update_book(&mut self, id: BookId, patch: BookPatch) -> LibraryResult<&Book> {
        self.catalog.update(id, patch)
    }

    // ==================== Reader Operations ====================

    /// Add a reader and return its id
    pub fn add_reader(
        &mut self,
        name: impl Into<String>,
        contact: impl Into<String>,
    ) -> LibraryResult<ReaderId> {
        self.members.add(name, contact)
    }

    /// Remove a reader with no loans
    pub fn remove_reader(&mut self, id: ReaderId) -> LibraryResult<Reader> {
        self.members.remove(id)
    }

    /// Get a reader by id
    pub fn find_reader(&self, id: ReaderId) -> Option<&Reader> {
        self.members.find(id)
    }

    /// Search name and contact
    pub fn search_readers(&self, keyword: &str) -> Vec<&Reader> {
        self.members.search(keyword)
    }

    /// All readers in membership order
    pub fn readers(&self) -> &[Reader] {
        self.members.all()
    }

    /// Change a reader's details
    pub fn update_reader(&mut self, id: ReaderId, patch: ReaderPatch) -> LibraryResult<&Reader> {
        self.members.update(id, patch)
    }

    /// The reader currently holding a book, if any
    pub fn holder_of(&self, book_id: BookId) -> Option<&Reader> {
        self.members.holder_of(book_id)
    }

    // ==================== Lending ====================

    /// Lend a book to a reader
    pub fn borrow(&mut self, reader_id: ReaderId, book_id: BookId) -> LibraryResult<()> {
        Lending::new(&mut self.catalog, &mut self.members).borrow(reader_id, book_id)
    }

    /// Take a book back from a reader
    pub fn return_book(&mut self, reader_id: ReaderId, book_id: BookId) -> LibraryResult<()> {
        Lending::new(&mut self.catalog, &mut self.members).return_book(reader_id, book_id)
    }

    /// Check book flags against reader borrowed-sets
    pub fn audit(&self) -> Vec<Inconsistency> {
        lending::audit(&self.catalog, &self.members)
    }

    // ==================== Persistence ====================

    /// Rewrite both record files, reporting the first failure
    ///
    /// The readers file is written even when the books file fails.
    pub fn save(&self) -> StorageResult<()> {
        let books = self.catalog.save();
        let readers = self.members.save();
        books.and(readers)
    }

    /// Final save before the library goes away
    pub fn close(self) -> StorageResult<()> {
        self.save()
    }
}

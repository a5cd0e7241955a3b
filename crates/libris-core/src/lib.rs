//! Libris Core Library
//!
//! This crate provides the data-management layer of Libris, a small
//! library's catalog and membership system: books, readers, and the loans
//! between them, persisted to two flat record files.
//!
//! # Quick Start
//!
//! ```text
//! let mut library = Library::open()?;
//!
//! let book = library.add_book("Dune", "Herbert", "Ace")?;
//! let reader = library.add_reader("Alice", "alice@x.com")?;
//! library.borrow(reader, book)?;
//! ```
//!
//! # Modules
//!
//! - `library`: The facade owning both collections (main entry point)
//! - `models`: Book and Reader records
//! - `collection`: In-memory collections with id allocation and search
//! - `lending`: Borrow/return coordination and loan audits
//! - `storage`: Record file format and persistence
//! - `config`: Application configuration

pub mod collection;
pub mod config;
pub mod error;
pub mod lending;
pub mod library;
pub mod models;
pub mod storage;

pub use collection::{Catalog, Collection, Membership};
pub use config::Config;
pub use error::{ErrorKind, LibraryError, LibraryResult};
pub use lending::{Inconsistency, Lending};
pub use library::{Library, LibraryStats};
pub use models::{Book, BookId, BookPatch, Reader, ReaderId, ReaderPatch, MAX_ID};
pub use storage::{StorageError, StorageResult};

//! In-memory record collections
//!
//! `Collection<T>` keeps one kind of record in insertion order, hands out
//! ids, and rewrites its backing file after every change. The two
//! instantiations are the `Catalog` (books) and the `Membership` store
//! (readers).
//!
//! Ids start at 1, resume at `max(loaded ids) + 1` after a load, and are
//! never handed out twice, even after the record holding one is removed.
//! Once `MAX_ID` has been handed out, `add` fails with `IdsExhausted`.

use std::path::Path;

use tracing::{debug, error};

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, BookId, BookPatch, Reader, ReaderId, ReaderPatch, MAX_ID};
use crate::storage::{Record, RecordFile, StorageResult};

/// The owning collection of all books
pub type Catalog = Collection<Book>;

/// The owning collection of all readers
pub type Membership = Collection<Reader>;

/// A record that can live in a `Collection`
pub trait Entry: Record {
    /// Partial update accepted by `Collection::update`
    type Patch;

    fn entry_id(&self) -> u32;
    fn assign_id(&mut self, id: u32);

    /// Case-insensitive match; `needle` is already lowercase
    fn matches(&self, needle: &str) -> bool;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Text fields by name, as they would be written
    fn text_fields(&self) -> Vec<(&'static str, &str)>;

    /// Text fields a patch would set
    fn patch_fields(patch: &Self::Patch) -> Vec<(&'static str, &str)>;

    /// Error reported when `id` is not in the collection
    fn not_found(id: u32) -> LibraryError;
}

impl Entry for Book {
    type Patch = BookPatch;

    fn entry_id(&self) -> u32 {
        self.id()
    }

    fn assign_id(&mut self, id: u32) {
        self.set_id(id);
    }

    fn matches(&self, needle: &str) -> bool {
        [self.name(), self.author(), self.publisher()]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    fn apply_patch(&mut self, patch: BookPatch) {
        self.apply(patch);
    }

    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", self.name()),
            ("author", self.author()),
            ("publisher", self.publisher()),
        ]
    }

    fn patch_fields(patch: &BookPatch) -> Vec<(&'static str, &str)> {
        [
            ("title", &patch.name),
            ("author", &patch.author),
            ("publisher", &patch.publisher),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    fn not_found(id: u32) -> LibraryError {
        LibraryError::BookNotFound(id)
    }
}

impl Entry for Reader {
    type Patch = ReaderPatch;

    fn entry_id(&self) -> u32 {
        self.id()
    }

    fn assign_id(&mut self, id: u32) {
        self.set_id(id);
    }

    fn matches(&self, needle: &str) -> bool {
        [self.name(), self.contact()]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    fn apply_patch(&mut self, patch: ReaderPatch) {
        self.apply(patch);
    }

    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name()), ("contact", self.contact())]
    }

    fn patch_fields(patch: &ReaderPatch) -> Vec<(&'static str, &str)> {
        [("name", &patch.name), ("contact", &patch.contact)]
            .into_iter()
            .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
            .collect()
    }

    fn not_found(id: u32) -> LibraryError {
        LibraryError::ReaderNotFound(id)
    }
}

/// Each text field takes exactly one line of the record file
fn check_single_line(fields: &[(&'static str, &str)]) -> LibraryResult<()> {
    match fields
        .iter()
        .find(|(_, value)| value.contains(['\n', '\r']))
    {
        Some(&(field, _)) => Err(LibraryError::LineBreakInField { field }),
        None => Ok(()),
    }
}

/// Records of one kind plus their backing file
#[derive(Debug)]
pub struct Collection<T> {
    records: Vec<T>,
    next_id: u32,
    file: RecordFile<T>,
}

impl<T: Entry> Collection<T> {
    /// Load the collection from its backing file
    ///
    /// A missing file gives an empty collection.
    pub fn open(file: RecordFile<T>) -> StorageResult<Self> {
        let records = file.load()?;
        let next_id = records
            .iter()
            .map(|r| r.entry_id().saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(1);

        Ok(Self {
            records,
            next_id,
            file,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The id the next added record will get
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in collection order
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// Find a record by id
    pub fn find(&self, id: u32) -> Option<&T> {
        self.records.iter().find(|r| r.entry_id() == id)
    }

    pub(crate) fn find_mut(&mut self, id: u32) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.entry_id() == id)
    }

    /// Records whose text fields contain `keyword`, ignoring case
    ///
    /// An empty keyword matches every record.
    pub fn search(&self, keyword: &str) -> Vec<&T> {
        let needle = keyword.to_lowercase();
        self.records.iter().filter(|r| r.matches(&needle)).collect()
    }

    /// Replace some fields of a record and persist
    pub fn update(&mut self, id: u32, patch: T::Patch) -> LibraryResult<&T> {
        let index = self.index_of(id)?;
        check_single_line(&T::patch_fields(&patch))?;
        self.records[index].apply_patch(patch);
        self.persist();
        Ok(&self.records[index])
    }

    /// Rewrite the backing file, reporting any failure to the caller
    pub fn save(&self) -> StorageResult<()> {
        self.file.save(&self.records)
    }

    /// Rewrite the backing file after a mutation
    ///
    /// The mutation stands even when the write fails; the failure is
    /// logged for the user instead.
    pub(crate) fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Could not save {}: {}", self.file.path().display(), e);
            if let Some(hint) = e.recovery_suggestion() {
                error!("{}", hint);
            }
        }
    }

    fn index_of(&self, id: u32) -> LibraryResult<usize> {
        self.records
            .iter()
            .position(|r| r.entry_id() == id)
            .ok_or_else(|| T::not_found(id))
    }

    fn insert(&mut self, mut record: T) -> LibraryResult<u32> {
        check_single_line(&record.text_fields())?;
        if self.next_id > MAX_ID {
            return Err(LibraryError::IdsExhausted);
        }

        let id = self.next_id;
        self.next_id += 1;
        record.assign_id(id);
        self.records.push(record);
        debug!("Added record {} to {:?}", id, self.file.path());
        self.persist();
        Ok(id)
    }

    fn take(&mut self, index: usize) -> T {
        let record = self.records.remove(index);
        debug!("Removed record {} from {:?}", record.entry_id(), self.file.path());
        self.persist();
        record
    }
}

impl Collection<Book> {
    /// Add an available book and return its id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
    ) -> LibraryResult<BookId> {
        self.insert(Book::new(0, name, author, publisher))
    }

    /// Remove a book that no reader holds
    pub fn remove(&mut self, id: BookId, members: &Membership) -> LibraryResult<Book> {
        let index = self.index_of(id)?;
        if let Some(holder) = members.holder_of(id) {
            return Err(LibraryError::BookOnLoan {
                book: id,
                reader: holder.id(),
            });
        }
        Ok(self.take(index))
    }

    /// Number of books currently lent out
    pub fn borrowed_count(&self) -> usize {
        self.records.iter().filter(|b| b.is_borrowed()).count()
    }
}

impl Collection<Reader> {
    /// Add a reader with no loans and return its id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        contact: impl Into<String>,
    ) -> LibraryResult<ReaderId> {
        self.insert(Reader::new(0, name, contact))
    }

    /// Remove a reader that holds no books
    pub fn remove(&mut self, id: ReaderId) -> LibraryResult<Reader> {
        let index = self.index_of(id)?;
        let count = self.records[index].borrowed_books().len();
        if count > 0 {
            return Err(LibraryError::ReaderHasLoans { reader: id, count });
        }
        Ok(self.take(index))
    }

    /// The first reader whose borrowed-set contains `book_id`
    pub fn holder_of(&self, book_id: BookId) -> Option<&Reader> {
        self.records.iter().find(|r| r.holds(book_id))
    }
}

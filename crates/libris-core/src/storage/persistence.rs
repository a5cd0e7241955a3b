//! Record file persistence
//!
//! A `RecordFile` owns the path of one backing file and moves a whole
//! collection in and out of it:
//!
//! - `load` reads every record it can; a missing file is an empty
//!   collection and a malformed tail is dropped with a warning.
//! - `save` rewrites the entire file using an atomic write (temp file,
//!   sync, rename), so a failed save never leaves a half-written file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::record::{decode_all, encode_all, Record};

/// Backing file for one collection of records
#[derive(Debug, Clone)]
pub struct RecordFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the backing file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load all well-formed records from the backing file
    ///
    /// Returns an empty collection if the file doesn't exist.
    /// Returns an error only if the file exists but can't be read.
    pub fn load(&self) -> StorageResult<Vec<T>> {
        let content = match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No record file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::read(e, self.path.clone())),
        };

        let decoded = decode_all::<T>(&content);
        if let Some(offset) = decoded.stopped_at {
            warn!(
                "Malformed record in {:?} at byte {}; keeping the {} record(s) before it",
                self.path,
                offset,
                decoded.records.len()
            );
        }
        debug!("Loaded {} record(s) from {:?}", decoded.records.len(), self.path);

        Ok(decoded.records)
    }

    /// Rewrite the backing file with the given records
    pub fn save(&self, records: &[T]) -> StorageResult<()> {
        atomic_write(&self.path, encode_all(records).as_bytes())?;
        debug!("Saved {} record(s) to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let write_temp = || -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };
    if let Err(e) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::write(e, path.to_path_buf()));
    }

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Reader};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = RecordFile::<Book>::new(temp_dir.path().join("book.dat"));

        assert!(!file.exists());
        assert!(file.load().unwrap().is_empty());
        // Loading must not create the file
        assert!(!file.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = RecordFile::<Reader>::new(temp_dir.path().join("reader.dat"));

        let mut alice = Reader::new(1, "Alice", "alice@x.com");
        alice.borrow_book(2);
        let readers = vec![alice, Reader::new(2, "Bob", "bob@x.com")];

        file.save(&readers).unwrap();
        assert!(file.exists());
        assert_eq!(file.load().unwrap(), readers);
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let file = RecordFile::<Book>::new(temp_dir.path().join("book.dat"));

        file.save(&[
            Book::new(1, "Dune", "Herbert", "Ace"),
            Book::new(2, "Emma", "Austen", "Murray"),
        ])
        .unwrap();
        file.save(&[Book::new(2, "Emma", "Austen", "Murray")]).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), 2);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("book.dat");
        let file = RecordFile::<Book>::new(&path);

        file.save(&[Book::new(1, "Dune", "Herbert", "Ace")]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file = RecordFile::<Book>::new(temp_dir.path().join("book.dat"));

        file.save(&[Book::new(1, "Dune", "Herbert", "Ace")]).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("book.dat")]);
    }

    #[test]
    fn test_partial_file_keeps_leading_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.dat");
        fs::write(
            &path,
            "1\nDune\nHerbert\nAce\n0\n\n2\nEmma\nAusten\nMurray\n0\n\n3\nUlysses\n",
        )
        .unwrap();

        let loaded = RecordFile::<Book>::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].name(), "Emma");
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory can't be read as a record file
        let file = RecordFile::<Book>::new(temp_dir.path());

        let err = file.load().unwrap_err();
        assert!(matches!(
            err,
            StorageError::ReadError { .. } | StorageError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_save_into_file_as_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let file = RecordFile::<Book>::new(blocker.join("book.dat"));
        let err = file.save(&[Book::new(1, "Dune", "Herbert", "Ace")]).unwrap_err();
        assert!(matches!(err, StorageError::CreateDirectory { .. }));
    }
}

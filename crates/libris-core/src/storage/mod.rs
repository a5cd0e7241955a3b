//! Storage layer
//!
//! Handles moving collections between memory and their flat record files.
//!
//! ## Layout
//!
//! - **record**: the line-oriented text format for books and readers
//! - **persistence**: whole-file load and atomic rewrite of one collection
//! - **error**: typed I/O failures with recovery hints

pub mod error;
pub mod persistence;
pub mod record;

pub use error::{StorageError, StorageResult};
pub use persistence::RecordFile;
pub use record::{decode_all, encode_all, Decoded, Record};

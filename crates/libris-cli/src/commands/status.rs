//! Status and consistency check handlers

use anyhow::{bail, Result};

use libris_core::Library;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(library: &Library, output: &Output) -> Result<()> {
    let stats = library.stats();
    let books_path = library.catalog().path();
    let readers_path = library.members().path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage": {
                        "books_file": books_path,
                        "readers_file": readers_path,
                    },
                    "counts": {
                        "books": stats.books,
                        "borrowed": stats.borrowed,
                        "available": stats.available(),
                        "readers": stats.readers,
                    },
                    "next_ids": {
                        "book": stats.next_book_id,
                        "reader": stats.next_reader_id,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{} {} {}", stats.books, stats.borrowed, stats.readers);
        }
        OutputFormat::Human => {
            println!("Libris Status");
            println!("=============");
            println!();
            println!("Storage:");
            println!("  Books:   {}", books_path.display());
            println!("  Readers: {}", readers_path.display());
            println!();
            println!("Contents:");
            println!(
                "  Books:   {} ({} available, {} borrowed)",
                stats.books,
                stats.available(),
                stats.borrowed
            );
            println!("  Readers: {}", stats.readers);
        }
    }

    Ok(())
}

/// Audit loan records, failing if anything disagrees
pub fn check(library: &Library, output: &Output) -> Result<()> {
    let findings = library.audit();
    output.print_findings(&findings);

    if !findings.is_empty() {
        bail!("{} inconsistent loan record(s) found", findings.len());
    }
    Ok(())
}

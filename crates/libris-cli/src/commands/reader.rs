//! Reader command handlers

use anyhow::{anyhow, bail, Context, Result};

use libris_core::{Library, Reader, ReaderId, ReaderPatch};

use crate::output::Output;
use crate::prompt::confirm;

/// Register a new reader
pub fn add(library: &mut Library, name: String, contact: String, output: &Output) -> Result<()> {
    let id = library
        .add_reader(name, contact)
        .context("Failed to add reader")?;
    output.success(&format!("Added reader: {}", id));
    if let Some(reader) = library.find_reader(id) {
        output.print_reader(reader);
    }
    Ok(())
}

/// List all readers
pub fn list(library: &Library, output: &Output) -> Result<()> {
    let readers: Vec<&Reader> = library.readers().iter().collect();
    output.print_readers(&readers);
    Ok(())
}

/// Show a single reader
pub fn show(library: &Library, id: ReaderId, output: &Output) -> Result<()> {
    let reader = library
        .find_reader(id)
        .ok_or_else(|| anyhow!("Reader not found: {}", id))?;

    output.print_reader(reader);
    Ok(())
}

/// Search name and contact
pub fn search(library: &Library, keyword: String, output: &Output) -> Result<()> {
    let readers = library.search_readers(&keyword);
    output.print_readers(&readers);
    Ok(())
}

/// Change some of a reader's details
pub fn edit(
    library: &mut Library,
    id: ReaderId,
    patch: ReaderPatch,
    output: &Output,
) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass --name or --contact.");
    }

    library
        .update_reader(id, patch)
        .with_context(|| format!("Failed to update reader {}", id))?;

    output.success("Reader updated");
    show(library, id, output)
}

/// Remove a reader
pub fn remove(library: &mut Library, id: ReaderId, yes: bool, output: &Output) -> Result<()> {
    let reader = library
        .find_reader(id)
        .ok_or_else(|| anyhow!("Reader not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!("Remove reader: {} - {}", reader.id(), reader.name());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = library
        .remove_reader(id)
        .with_context(|| format!("Failed to remove reader {}", id))?;

    output.success(&format!("Removed reader: {} - {}", removed.id(), removed.name()));
    Ok(())
}

//! Libris CLI
//!
//! Command-line interface for Libris - library catalog, membership and
//! lending. Runs the interactive menu when no command is given.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use libris_core::{BookPatch, Config, Library, ReaderPatch};

mod commands;
mod logging;
mod menu;
mod output;
mod prompt;

use menu::Menu;
use output::{Output, OutputFormat};
use prompt::Prompter;

#[derive(Parser)]
#[command(name = "libris")]
#[command(about = "Libris - small library catalog and lending")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu
    Menu,
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage readers
    Reader {
        #[command(subcommand)]
        command: ReaderCommands,
    },
    /// Lend a book to a reader
    Borrow {
        /// Reader ID
        reader_id: u32,
        /// Book ID
        book_id: u32,
    },
    /// Return a borrowed book
    Return {
        /// Reader ID
        reader_id: u32,
        /// Book ID
        book_id: u32,
    },
    /// Show record files and counts
    Status,
    /// Check that book flags and reader loans agree
    Check,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a new book
    Add {
        title: String,
        author: String,
        publisher: String,
    },
    /// List all books
    #[command(alias = "ls")]
    List,
    /// Show book details
    Show {
        /// Book ID
        id: u32,
    },
    /// Search title, author and publisher (case-insensitive)
    Search {
        /// Keyword to look for
        keyword: String,
    },
    /// Change a book's details
    Edit {
        /// Book ID
        id: u32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        publisher: Option<String>,
    },
    /// Remove a book that is not on loan
    #[command(alias = "rm")]
    Remove {
        /// Book ID
        id: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ReaderCommands {
    /// Register a new reader
    Add { name: String, contact: String },
    /// List all readers
    #[command(alias = "ls")]
    List,
    /// Show reader details
    Show {
        /// Reader ID
        id: u32,
    },
    /// Search name and contact (case-insensitive)
    Search {
        /// Keyword to look for
        keyword: String,
    },
    /// Change a reader's details
    Edit {
        /// Reader ID
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
    /// Remove a reader with no loans
    #[command(alias = "rm")]
    Remove {
        /// Reader ID
        id: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, books_file, readers_file, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the library
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    let mut library = Library::open_with_config(config)?;

    let result = match cli.command {
        None | Some(Commands::Menu) => run_menu(&mut library),
        Some(Commands::Book { command }) => handle_book_command(command, &mut library, &output),
        Some(Commands::Reader { command }) => {
            handle_reader_command(command, &mut library, &output)
        }
        Some(Commands::Borrow { reader_id, book_id }) => {
            commands::lending::borrow(&mut library, reader_id, book_id, &output)
        }
        Some(Commands::Return { reader_id, book_id }) => {
            commands::lending::return_book(&mut library, reader_id, book_id, &output)
        }
        Some(Commands::Status) => commands::status::show(&library, &output),
        Some(Commands::Check) => commands::status::check(&library, &output),
        Some(Commands::Config { .. }) => unreachable!(), // Handled above
    };

    // Both record files are rewritten once more on the way out
    let closed = library.close().context("Failed to save library on exit");
    result.and(closed)
}

fn run_menu(library: &mut Library) -> Result<()> {
    let stdin = io::stdin();
    let prompter = Prompter::new(stdin.lock(), io::stdout(), prompt::is_interactive());
    Menu::new(library, prompter).run()
}

fn handle_book_command(
    command: BookCommands,
    library: &mut Library,
    output: &Output,
) -> Result<()> {
    match command {
        BookCommands::Add {
            title,
            author,
            publisher,
        } => commands::book::add(library, title, author, publisher, output),
        BookCommands::List => commands::book::list(library, output),
        BookCommands::Show { id } => commands::book::show(library, id, output),
        BookCommands::Search { keyword } => commands::book::search(library, keyword, output),
        BookCommands::Edit {
            id,
            title,
            author,
            publisher,
        } => {
            let patch = BookPatch {
                name: title,
                author,
                publisher,
            };
            commands::book::edit(library, id, patch, output)
        }
        BookCommands::Remove { id, yes } => commands::book::remove(library, id, yes, output),
    }
}

fn handle_reader_command(
    command: ReaderCommands,
    library: &mut Library,
    output: &Output,
) -> Result<()> {
    match command {
        ReaderCommands::Add { name, contact } => {
            commands::reader::add(library, name, contact, output)
        }
        ReaderCommands::List => commands::reader::list(library, output),
        ReaderCommands::Show { id } => commands::reader::show(library, id, output),
        ReaderCommands::Search { keyword } => commands::reader::search(library, keyword, output),
        ReaderCommands::Edit { id, name, contact } => {
            commands::reader::edit(library, id, ReaderPatch { name, contact }, output)
        }
        ReaderCommands::Remove { id, yes } => commands::reader::remove(library, id, yes, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_borrow() {
        let cli = Cli::try_parse_from(["libris", "borrow", "1", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Borrow {
                reader_id: 1,
                book_id: 2
            })
        ));
    }

    #[test]
    fn test_parse_book_edit() {
        let cli =
            Cli::try_parse_from(["libris", "--json", "book", "edit", "3", "--author", "Le Guin"])
                .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Book {
                command:
                    BookCommands::Edit {
                        id,
                        title,
                        author,
                        publisher,
                    },
            }) => {
                assert_eq!(id, 3);
                assert!(title.is_none());
                assert_eq!(author.as_deref(), Some("Le Guin"));
                assert!(publisher.is_none());
            }
            _ => panic!("expected book edit"),
        }
    }

    #[test]
    fn test_parse_rejects_negative_id() {
        assert!(Cli::try_parse_from(["libris", "book", "show", "-1"]).is_err());
    }

    #[test]
    fn test_no_command_means_menu() {
        let cli = Cli::try_parse_from(["libris"]).unwrap();
        assert!(cli.command.is_none());
    }
}

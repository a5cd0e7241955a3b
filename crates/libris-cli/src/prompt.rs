//! Terminal prompts
//!
//! Line-based input helpers shared by the one-shot commands and the
//! interactive menu. Prompts are written only when stdin is a terminal, so
//! piped input produces clean output.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Whether stdin is an interactive terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Line reader with optional prompt echo
pub struct Prompter<R, W> {
    input: R,
    output: W,
    echo_prompts: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, echo_prompts: bool) -> Self {
        Self {
            input,
            output,
            echo_prompts,
        }
    }

    /// Where menu text goes
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    /// Read one line without its line ending
    ///
    /// Returns `None` at end of input.
    pub fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.echo_prompts {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
        }

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\n', '\r']);
        Ok(Some(trimmed.to_string()))
    }

    /// Read a number, re-asking on anything that isn't one
    ///
    /// Returns `None` at end of input.
    pub fn number(&mut self, prompt: &str) -> Result<Option<u32>> {
        loop {
            let Some(line) = self.line(prompt)? else {
                return Ok(None);
            };
            match line.trim().parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => writeln!(self.output, "Please enter a number.")?,
            }
        }
    }
}

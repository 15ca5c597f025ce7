//! Interactive yes/no prompts.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Interpret one answer line. `None` means the answer was not understood.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question on stdout, reading from `input`.
///
/// Empty input is treated as 'no', as is end of input.
pub fn confirm_from<R: BufRead>(input: &mut R, prompt: &str) -> Result<bool> {
    loop {
        print!("{prompt} (y/N): ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read user input")?;
        if read == 0 {
            println!();
            return Ok(false);
        }

        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => eprintln!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}

/// Ask a yes/no question on the terminal.
pub fn prompt_confirmation(prompt: &str) -> Result<bool> {
    confirm_from(&mut io::stdin().lock(), prompt)
}

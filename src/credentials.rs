use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};

const PROMPT: &str = "Database password: ";

/// Where the database password comes from. Exactly one per invocation.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordSource {
    /// Prompt on the terminal and read one line with echo off.
    Stdin,
    /// First line of a local file, trimmed.
    File(PathBuf),
    /// Given on the command line. Works, but logs a warning.
    Inline(String),
}

impl std::fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("Stdin"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(_) => f.write_str("Inline(***)"),
        }
    }
}

pub fn resolve_password(source: &PasswordSource) -> Result<String> {
    match source {
        PasswordSource::Stdin => Ok(rpassword::prompt_password(PROMPT)?),
        _ => resolve_password_with(source, std::io::empty(), std::io::sink()),
    }
}

/// Same as [`resolve_password`] with the prompt streams supplied by the
/// caller. Echo control only applies to a real terminal.
pub fn resolve_password_with(
    source: &PasswordSource,
    mut input: impl BufRead,
    mut prompt: impl Write,
) -> Result<String> {
    match source {
        PasswordSource::Stdin => {
            write!(prompt, "{PROMPT}")?;
            prompt.flush()?;
            Ok(rpassword::read_password_from_bufread(&mut input)?)
        }
        PasswordSource::File(path) => {
            let text = std::fs::read_to_string(path)?;
            text.lines()
                .next()
                .map(|l| l.trim().to_string())
                .ok_or_else(|| Error::Config(format!("password file {} is empty", path.display())))
        }
        PasswordSource::Inline(pw) => {
            warn!("supplying a password on the command line is insecure");
            Ok(pw.clone())
        }
    }
}

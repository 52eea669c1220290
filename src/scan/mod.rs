//! Find every line under a directory that contains the TODO marker.

use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    todo::Match,
};

pub mod grep;
pub mod walk;

pub use grep::GrepSearch;
pub use walk::WalkSearch;

pub trait Search {
    /// Lists lines under `root` containing `marker`, in whatever order the
    /// backend finds them. `root` is already known to be a directory.
    fn search(&self, root: &Path, marker: &str) -> Result<Vec<Match>>;
}

pub fn scan(search: &dyn Search, root: &Path, marker: &str) -> Result<Vec<Match>> {
    validate_root(root)?;
    search.search(root, marker)
}

fn validate_root(root: &Path) -> Result<()> {
    let reason = if !root.exists() {
        "path does not exist"
    } else if !root.is_dir() {
        "path is not a directory"
    } else {
        return Ok(());
    };

    Err(Error::Validation {
        path: root.to_path_buf(),
        reason,
    })
}

/// Splits a `file:line:text` search result on its first two colons. Anything
/// after the second colon is the text, colons included.
pub fn parse_match_line(line: &str) -> Result<Match> {
    let format_error = |reason| Error::Format {
        line: line.to_owned(),
        reason,
    };

    let mut parts = line.splitn(3, ':');
    let (file, number, text) = match (parts.next(), parts.next(), parts.next()) {
        (Some(file), Some(number), Some(text)) => (file, number, text),
        _ => return Err(format_error("expected `file:line:text`")),
    };

    if file.is_empty() {
        return Err(format_error("empty file name"));
    }
    let line_number = match number.parse::<usize>() {
        Ok(n) if n > 0 && number.bytes().all(|b| b.is_ascii_digit()) => n,
        _ => return Err(format_error("line number is not a positive integer")),
    };

    Ok(Match {
        file_path: PathBuf::from(file),
        line_number,
        text: text.to_owned(),
    })
}

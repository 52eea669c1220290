use std::{path::PathBuf, time::Duration};

/// One TODO line found by a scan, before anything is known about its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub file_path: PathBuf,

    /// 1-indexed
    pub line_number: usize,

    /// The whole matched line, exactly as the search reported it.
    pub text: String,
}

/// A TODO together with who wrote it and how long ago.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    pub file_path: PathBuf,

    /// 1-indexed
    pub line_number: usize,

    pub text: String,
    pub author: String,
    pub age: Duration,
}

impl TodoRecord {
    pub fn new(found: Match, author: String, age: Duration) -> Self {
        TodoRecord {
            file_path: found.file_path,
            line_number: found.line_number,
            text: found.text,
            author,
            age,
        }
    }
}

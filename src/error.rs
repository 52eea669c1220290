use std::{path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The scan root is missing or is not a directory.
    #[error("{}: {reason}", .path.display())]
    Validation { path: PathBuf, reason: &'static str },

    /// An external tool could not be run to completion.
    #[error("`{command}` {kind}")]
    Process {
        command: String,
        #[source]
        kind: ProcessFailure,
    },

    /// The version-control backend has no usable blame data. `line` is unset
    /// when the whole file failed.
    #[error("no blame data for {}{}: {reason}", .path.display(), at_line(.line))]
    Lookup {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },

    /// A line of search output is not `file:line:text`.
    #[error("malformed search output {line:?}: {reason}")]
    Format { line: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum ProcessFailure {
    #[error("could not be started: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("was not run inside a git repository")]
    NotARepository,
}

impl Error {
    pub(crate) fn lookup(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Lookup {
            path: path.into(),
            line: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn lookup_at(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Error::Lookup {
            path: path.into(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    pub(crate) fn process(command: impl Into<String>, kind: ProcessFailure) -> Self {
        Error::Process {
            command: command.into(),
            kind,
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!(":{}", line)).unwrap_or_default()
}

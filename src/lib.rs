//! Find TODOs in a git working tree and list them by how long ago they were
//! written.
//!
//! A run is [`scan`] → [`annotate`] → [`report`]: search for the marker, blame
//! every matching line, then sort and print.

pub mod annotate;
pub mod blame;
pub mod clock;
pub mod config;
pub mod console_emitter;
pub mod error;
pub mod process;
pub mod report;
pub mod scan;
pub mod todo;

use log::info;
use termcolor::WriteColor;

use crate::{
    annotate::Annotator,
    blame::GitBlame,
    clock::Clock,
    config::{Config, SearchBackend},
    console_emitter::ColoredWriter,
    scan::{GrepSearch, Search, WalkSearch},
};

pub use error::{Error, ProcessFailure, Result};
pub use todo::{Match, TodoRecord};

/// How a run went, for the caller to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub reported: usize,
    pub skipped: usize,
}

/// Scans `config.root_dir`, blames every TODO with git and writes the sorted
/// report to `out`.
pub fn run<W: WriteColor>(
    config: &Config,
    clock: &dyn Clock,
    out: &mut ColoredWriter<W>,
) -> anyhow::Result<Summary> {
    let grep = GrepSearch {
        timeout: config.timeout,
    };
    let search: &dyn Search = match config.search {
        SearchBackend::Grep => &grep,
        SearchBackend::Walk => &WalkSearch,
    };

    let matches = scan::scan(search, &config.root_dir, &config.marker)?;
    info!("Found {} lines containing {:?}", matches.len(), config.marker);

    let blame = GitBlame {
        timeout: config.timeout,
    };
    let mut annotated = Annotator {
        blame: &blame,
        clock,
        on_lookup_failure: config.on_lookup_failure,
    }
    .annotate(matches)?;

    report::sort_by_age(&mut annotated.records, config.order);
    report::render(&annotated.records, out)?;
    out.flush()?;

    Ok(Summary {
        reported: annotated.records.len(),
        skipped: annotated.skipped,
    })
}

//! Search in-process by walking the tree with `ignore`, so `.gitignore`d and
//! hidden files are skipped.

use std::path::Path;

use log::{debug, warn};

use crate::{error::Result, todo::Match};

use super::Search;

pub struct WalkSearch;

impl Search for WalkSearch {
    fn search(&self, root: &Path, marker: &str) -> Result<Vec<Match>> {
        let mut matches = Vec::new();

        for entry in ignore::WalkBuilder::new(root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map_or(false, |t| t.is_file()) {
                continue;
            }

            let file_path = entry.path();
            let file_contents = match std::fs::read_to_string(file_path) {
                Ok(contents) => contents,
                Err(e) => {
                    debug!("Not searching {}: {}", file_path.display(), e);
                    continue;
                }
            };

            for (row_zero_indexed, line) in file_contents.lines().enumerate() {
                if line.contains(marker) {
                    matches.push(Match {
                        file_path: file_path.to_path_buf(),
                        line_number: row_zero_indexed + 1,
                        text: line.to_owned(),
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then(a.line_number.cmp(&b.line_number))
        });
        debug!("walk found {} matches under {}", matches.len(), root.display());

        Ok(matches)
    }
}

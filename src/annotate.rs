//! Join scan results with blame data.

use std::{collections::HashMap, path::PathBuf};

use log::{debug, warn};

use crate::{
    blame::Blame,
    clock::Clock,
    error::{Error, Result},
    todo::{Match, TodoRecord},
};

/// What to do with a TODO whose line has no blame data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    /// Log a warning and leave the TODO out of the report.
    Skip,
    /// Stop the whole run.
    Abort,
}

#[derive(Debug, Default)]
pub struct Annotated {
    pub records: Vec<TodoRecord>,
    pub skipped: usize,
}

pub struct Annotator<'a> {
    pub blame: &'a dyn Blame,
    pub clock: &'a dyn Clock,
    pub on_lookup_failure: LookupFailure,
}

impl Annotator<'_> {
    /// Blames each file once for all of its matches. Process failures are
    /// always fatal; lookup failures follow `on_lookup_failure`.
    pub fn annotate(&self, matches: Vec<Match>) -> Result<Annotated> {
        let now = self.clock.now();
        let mut annotated = Annotated::default();

        for (file_path, matches) in group_by_file(matches) {
            let lines: Vec<usize> = matches.iter().map(|m| m.line_number).collect();

            let blamed = match self.blame.blame_lines(&file_path, &lines) {
                Ok(blamed) => blamed,
                Err(e @ Error::Lookup { .. }) => {
                    if self.on_lookup_failure == LookupFailure::Abort {
                        return Err(e);
                    }
                    for found in &matches {
                        let location = found.file_path.display();
                        warn!("Skipping {}:{}: {}", location, found.line_number, e);
                    }
                    annotated.skipped += matches.len();
                    continue;
                }
                Err(e) => return Err(e),
            };

            for found in matches {
                match blamed.get(&found.line_number) {
                    Some(line) => {
                        let age = line.age_at(now);
                        let author = line.author.clone();
                        annotated.records.push(TodoRecord::new(found, author, age));
                    }
                    None => {
                        let e = Error::lookup_at(
                            found.file_path,
                            found.line_number,
                            "line was not blamed",
                        );
                        if self.on_lookup_failure == LookupFailure::Abort {
                            return Err(e);
                        }
                        warn!("Skipping {}", e);
                        annotated.skipped += 1;
                    }
                }
            }
        }

        debug!(
            "Annotated {} TODOs, skipped {}",
            annotated.records.len(),
            annotated.skipped
        );
        Ok(annotated)
    }

}

/// Groups matches by file, keeping files in the order they were first seen.
fn group_by_file(matches: Vec<Match>) -> Vec<(PathBuf, Vec<Match>)> {
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<(PathBuf, Vec<Match>)> = Vec::new();

    for found in matches {
        match index.get(&found.file_path) {
            Some(&i) => groups[i].1.push(found),
            None => {
                index.insert(found.file_path.clone(), groups.len());
                groups.push((found.file_path.clone(), vec![found]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{blame::BlameLine, clock::FixedClock, error::ProcessFailure};
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::{cell::RefCell, collections::BTreeMap, path::Path, time::Duration};

    const NOW: i64 = 1_700_000_000;

    /// Blames every line of `good.rs` to alice one hour ago, refuses
    /// `untracked.rs`, and knows nothing about line 99 of anything.
    #[derive(Default)]
    struct FakeBlame {
        calls: RefCell<Vec<(PathBuf, Vec<usize>)>>,
        broken: bool,
    }

    impl Blame for FakeBlame {
        fn blame_lines(&self, file: &Path, lines: &[usize]) -> Result<BTreeMap<usize, BlameLine>> {
            self.calls
                .borrow_mut()
                .push((file.to_path_buf(), lines.to_vec()));

            if self.broken {
                return Err(Error::process("git blame", ProcessFailure::NotARepository));
            }
            if file == Path::new("untracked.rs") {
                return Err(Error::lookup(file, "no such path in HEAD"));
            }

            Ok(lines
                .iter()
                .filter(|&&line| line != 99)
                .map(|&line| {
                    let blamed = BlameLine {
                        commit: "c0ffee".repeat(7),
                        author: "alice".to_owned(),
                        author_time: FixedOffset::east_opt(0)
                            .unwrap()
                            .timestamp_opt(NOW - 3600 * line as i64, 0)
                            .unwrap(),
                    };
                    (line, blamed)
                })
                .collect())
        }
    }

    fn found(file: &str, line: usize) -> Match {
        Match {
            file_path: PathBuf::from(file),
            line_number: line,
            text: format!("TODO #{}", line),
        }
    }

    fn annotator<'a>(
        blame: &'a FakeBlame,
        clock: &'a FixedClock,
        on_lookup_failure: LookupFailure,
    ) -> Annotator<'a> {
        Annotator {
            blame,
            clock,
            on_lookup_failure,
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.timestamp_opt(NOW, 0).unwrap())
    }

    #[test]
    fn builds_records_with_ages() {
        let blame = FakeBlame::default();
        let clock = clock();
        let annotated = annotator(&blame, &clock, LookupFailure::Abort)
            .annotate(vec![found("good.rs", 2)])
            .unwrap();

        assert_eq!(annotated.skipped, 0);
        assert_eq!(
            annotated.records,
            vec![TodoRecord {
                file_path: PathBuf::from("good.rs"),
                line_number: 2,
                text: "TODO #2".to_owned(),
                author: "alice".to_owned(),
                age: Duration::from_secs(2 * 3600),
            }]
        );
    }

    #[test]
    fn blames_each_file_once() {
        let blame = FakeBlame::default();
        let clock = clock();
        annotator(&blame, &clock, LookupFailure::Abort)
            .annotate(vec![found("a.rs", 1), found("b.rs", 4), found("a.rs", 7)])
            .unwrap();

        assert_eq!(
            *blame.calls.borrow(),
            vec![
                (PathBuf::from("a.rs"), vec![1, 7]),
                (PathBuf::from("b.rs"), vec![4]),
            ]
        );
    }

    #[test]
    fn skips_unblamable_files_by_request() {
        let blame = FakeBlame::default();
        let clock = clock();
        let annotated = annotator(&blame, &clock, LookupFailure::Skip)
            .annotate(vec![
                found("untracked.rs", 1),
                found("untracked.rs", 2),
                found("good.rs", 1),
                found("good.rs", 99),
            ])
            .unwrap();

        assert_eq!(annotated.skipped, 3);
        assert_eq!(annotated.records.len(), 1);
        assert_eq!(annotated.records[0].file_path, PathBuf::from("good.rs"));
    }

    #[test]
    fn aborts_on_lookup_failure_when_strict() {
        let blame = FakeBlame::default();
        let clock = clock();
        let err = annotator(&blame, &clock, LookupFailure::Abort)
            .annotate(vec![found("good.rs", 1), found("good.rs", 99)])
            .unwrap_err();

        match err {
            Error::Lookup { path, line, .. } => {
                assert_eq!(path, PathBuf::from("good.rs"));
                assert_eq!(line, Some(99));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn whole_file_failure_aborts_without_a_line() {
        let blame = FakeBlame::default();
        let clock = clock();
        let err = annotator(&blame, &clock, LookupFailure::Abort)
            .annotate(vec![found("untracked.rs", 3)])
            .unwrap_err();

        assert!(matches!(err, Error::Lookup { line: None, .. }), "{}", err);
    }

    #[test]
    fn process_errors_are_always_fatal() {
        let blame = FakeBlame {
            broken: true,
            ..FakeBlame::default()
        };
        let clock = clock();
        let err = annotator(&blame, &clock, LookupFailure::Skip)
            .annotate(vec![found("good.rs", 1)])
            .unwrap_err();

        assert!(matches!(err, Error::Process { .. }));
    }

    #[test]
    fn no_matches_no_blame() {
        let blame = FakeBlame::default();
        let clock = clock();
        let annotated = annotator(&blame, &clock, LookupFailure::Abort)
            .annotate(Vec::new())
            .unwrap();

        assert!(annotated.records.is_empty());
        assert!(blame.calls.borrow().is_empty());
    }
}

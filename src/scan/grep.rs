//! Search with an external `grep -rn` and tokenize its output.

use std::{ffi::OsString, path::Path, time::Duration};

use log::debug;

use crate::{
    error::{Error, ProcessFailure, Result},
    process::run_captured,
    todo::Match,
};

use super::{parse_match_line, Search};

pub struct GrepSearch {
    pub timeout: Duration,
}

impl Search for GrepSearch {
    fn search(&self, root: &Path, marker: &str) -> Result<Vec<Match>> {
        let args: Vec<OsString> = vec![
            "-rnI".into(),
            "--exclude-dir=.git".into(),
            "-F".into(),
            "-e".into(),
            marker.into(),
            "--".into(),
            root.into(),
        ];

        let output = run_captured("grep", &args, None, self.timeout)?;
        match output.status.code() {
            Some(0) => {}
            // no lines matched
            Some(1) => return Ok(Vec::new()),
            _ => {
                return Err(Error::process(
                    format!("grep -rn {}", root.display()),
                    ProcessFailure::Failed {
                        status: output.status,
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                    },
                ))
            }
        }

        let matches = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_match_line)
            .collect::<Result<Vec<_>>>()?;
        debug!("grep found {} matches under {}", matches.len(), root.display());

        Ok(matches)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};

    fn grep() -> GrepSearch {
        GrepSearch {
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn finds_marker_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), "one\ntwo\nTODO fix this\n").unwrap();
        fs::write(dir.path().join("bar.txt"), "nothing here\n").unwrap();

        let matches = grep().search(dir.path(), "TODO").unwrap();

        assert_eq!(
            matches,
            vec![Match {
                file_path: dir.path().join("foo.txt"),
                line_number: 3,
                text: "TODO fix this".to_owned(),
            }]
        );
    }

    #[test]
    fn no_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), "all done\n").unwrap();

        assert!(grep().search(dir.path(), "TODO").unwrap().is_empty());
    }

    #[test]
    fn skips_git_directory_and_binaries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("hook"), "TODO in git internals\n").unwrap();
        fs::write(dir.path().join("blob.bin"), b"\0\0TODO\0").unwrap();
        fs::write(dir.path().join("real.rs"), "// TODO: real\n").unwrap();

        let matches = grep().search(dir.path(), "TODO").unwrap();

        let files: Vec<PathBuf> = matches.into_iter().map(|m| m.file_path).collect();
        assert_eq!(files, vec![dir.path().join("real.rs")]);
    }

    #[test]
    fn marker_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "FIXME.\nFIXMEX\nFIXME?\n").unwrap();

        let matches = grep().search(dir.path(), "FIXME?").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 3);
    }
}

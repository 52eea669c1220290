//! Attribute lines of a tracked file to the commit that last touched them, via
//! `git blame --incremental`.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    ffi::OsString,
    path::Path,
    time::Duration,
};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use log::debug;

use crate::{
    error::{Error, ProcessFailure, Result},
    process::run_captured,
};

/// Who last changed a line, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    pub commit: String,
    pub author: String,
    pub author_time: DateTime<FixedOffset>,
}

impl BlameLine {
    /// Time elapsed between the commit and `now`. Commits dated in the future
    /// count as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.author_time.with_timezone(&Utc))
            .to_std()
            .unwrap_or_default()
    }
}

pub trait Blame {
    /// Blames every line in `lines` (1-indexed) in one go. Lines the backend
    /// reports nothing for are absent from the result.
    fn blame_lines(&self, file: &Path, lines: &[usize]) -> Result<BTreeMap<usize, BlameLine>>;

    fn blame_line(
        &self,
        file: &Path,
        line: usize,
        now: DateTime<Utc>,
    ) -> Result<(String, Duration)> {
        let mut blamed = self.blame_lines(file, &[line])?;
        let found = blamed
            .remove(&line)
            .ok_or_else(|| Error::lookup_at(file, line, "line was not blamed"))?;
        let age = found.age_at(now);
        Ok((found.author, age))
    }
}

pub struct GitBlame {
    pub timeout: Duration,
}

impl Blame for GitBlame {
    fn blame_lines(&self, file: &Path, lines: &[usize]) -> Result<BTreeMap<usize, BlameLine>> {
        let lines: BTreeSet<usize> = lines.iter().copied().collect();
        if lines.is_empty() {
            return Ok(BTreeMap::new());
        }

        // Run next to the file so any repository works, not just the one we were started in.
        let (dir, name) = match (file.parent(), file.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => (Some(parent), name),
            (_, Some(name)) => (None, name),
            _ => return Err(Error::lookup(file, "not a file path")),
        };

        let mut args: Vec<OsString> = vec!["blame".into(), "--incremental".into()];
        for line in &lines {
            args.push(format!("-L{},{}", line, line).into());
        }
        args.push("--".into());
        args.push(name.into());

        let output = run_captured("git", &args, dir, self.timeout)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            if stderr.contains("not a git repository") {
                return Err(Error::process("git blame", ProcessFailure::NotARepository));
            }
            return Err(Error::lookup(file, stderr));
        }

        let blamed = parse_incremental(file, &String::from_utf8_lossy(&output.stdout))?;
        debug!("Blamed {} of {} lines in {}", blamed.len(), lines.len(), file.display());

        Ok(blamed
            .into_iter()
            .filter(|(line, _)| lines.contains(line))
            .collect())
    }
}

#[derive(Default)]
struct CommitInfo {
    author: Option<String>,
    author_time: Option<i64>,
    author_tz: Option<FixedOffset>,
}

#[derive(Clone, Copy)]
struct Group<'a> {
    commit: &'a str,
    final_line: usize,
    num_lines: usize,
}

/// Parses the output of `git blame --incremental` into a map from final line
/// number to its blame.
///
/// Each group starts with `<sha> <orig-line> <final-line> <num-lines>` and
/// ends with `filename <path>`. The header fields (`author`, `author-time`,
/// ...) only appear the first time a commit is mentioned, so later groups
/// reuse what was seen before.
pub fn parse_incremental(file: &Path, output: &str) -> Result<BTreeMap<usize, BlameLine>> {
    let mut commits: HashMap<&str, CommitInfo> = HashMap::new();
    let mut blamed = BTreeMap::new();
    let mut current: Option<Group> = None;

    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let group = match current {
            Some(group) => group,
            None => {
                let group = parse_group_header(file, line)?;
                commits.entry(group.commit).or_default();
                current = Some(group);
                continue;
            }
        };

        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        let info = commits.entry(group.commit).or_default();
        match key {
            "author" if !value.is_empty() => info.author = Some(value.to_owned()),
            "author-time" => {
                let seconds = value
                    .parse()
                    .map_err(|_| Error::lookup(file, format!("bad author-time {:?}", value)))?;
                info.author_time = Some(seconds);
            }
            "author-tz" => info.author_tz = Some(parse_tz(file, value)?),
            "filename" => {
                let blame = finish_commit(file, group.commit, info)?;
                for final_line in group.final_line..group.final_line + group.num_lines {
                    blamed.insert(final_line, blame.clone());
                }
                current = None;
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(Error::lookup(file, "blame output ended in the middle of an entry"));
    }

    Ok(blamed)
}

fn parse_group_header<'a>(file: &Path, line: &'a str) -> Result<Group<'a>> {
    let malformed = || Error::lookup(file, format!("unexpected blame line {:?}", line));

    let mut parts = line.split_whitespace();
    let commit = parts.next().ok_or_else(malformed)?;
    if commit.len() < 40 || !commit.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let mut numbers = parts.map(|part| part.parse::<usize>());
    let (_orig, final_line, num_lines) = match (numbers.next(), numbers.next(), numbers.next()) {
        (Some(Ok(orig)), Some(Ok(final_line)), Some(Ok(num_lines))) => {
            (orig, final_line, num_lines)
        }
        _ => return Err(malformed()),
    };

    Ok(Group {
        commit,
        final_line,
        num_lines,
    })
}

/// `+HHMM` or `-HHMM`, as written by git.
fn parse_tz(file: &Path, value: &str) -> Result<FixedOffset> {
    let bad = || Error::lookup(file, format!("bad author-tz {:?}", value));

    let (sign, digits) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(bad()),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| bad())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| bad())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}

fn finish_commit(file: &Path, commit: &str, info: &CommitInfo) -> Result<BlameLine> {
    let missing = |key: &str| Error::lookup(file, format!("commit {} has no {}", commit, key));

    let author = info.author.clone().ok_or_else(|| missing("author"))?;
    let seconds = info.author_time.ok_or_else(|| missing("author-time"))?;
    let tz = info.author_tz.ok_or_else(|| missing("author-tz"))?;
    let author_time = tz
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| Error::lookup(file, format!("author-time {} is out of range", seconds)))?;

    Ok(BlameLine {
        commit: commit.to_owned(),
        author,
        author_time,
    })
}

//! A throwaway git repository whose commits can be backdated.

use std::{fs, path::Path, process::Command};

use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let repo = TestRepo {
            dir: TempDir::new().unwrap(),
        };
        repo.git(&["init", "--quiet"], None);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    /// Commits `name` as `author`, dated `timestamp` (unix seconds) in `tz`
    /// (`+HHMM`).
    pub fn commit(&self, name: &str, author: &str, timestamp: i64, tz: &str) {
        let date = format!("@{} {}", timestamp, tz);
        self.git(&["add", "--", name], None);
        self.git(
            &["commit", "--quiet", "--no-verify", "-m", &format!("add {}", name)],
            Some((author, &date)),
        );
    }

    fn git(&self, args: &[&str], author: Option<(&str, &str)>) {
        let mut command = Command::new("git");
        command
            .current_dir(self.path())
            .args(&["-c", "commit.gpgsign=false", "-c", "core.hooksPath=/dev/null"])
            .args(args)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_COMMITTER_NAME", "Committer")
            .env("GIT_COMMITTER_EMAIL", "committer@example.com")
            .env("GIT_AUTHOR_NAME", "Nobody")
            .env("GIT_AUTHOR_EMAIL", "nobody@example.com");
        if let Some((name, date)) = author {
            command
                .env("GIT_AUTHOR_NAME", name)
                .env("GIT_AUTHOR_DATE", date)
                .env("GIT_COMMITTER_DATE", date);
        }

        let output = command.output().expect("git should be installed");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

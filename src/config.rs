use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use structopt::StructOpt;

use crate::{annotate::LookupFailure, report::SortOrder};

/// Looked for in the scanned directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".blame-todo.toml";

const DEFAULT_MARKER: &str = "TODO";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// List TODOs within a directory indexed by git and when they were written.
#[derive(Debug, StructOpt)]
#[structopt(name = "blame-todo")]
pub struct Opt {
    #[structopt(name = "ROOT_DIR", parse(from_os_str))]
    pub root_dir: PathBuf,

    /// Literal text that marks a TODO [default: TODO]
    #[structopt(long)]
    pub marker: Option<String>,

    /// List the longest-standing TODOs first instead of the newest
    #[structopt(long = "oldest-first")]
    pub oldest_first: bool,

    /// Fail instead of skipping TODOs git has no blame for
    #[structopt(long)]
    pub strict: bool,

    /// Seconds to wait for each `grep`/`git` call [default: 30]
    #[structopt(long = "timeout")]
    pub timeout_secs: Option<u64>,

    /// How to find TODOs: `grep` or `walk` [default: grep]
    #[structopt(long)]
    pub search: Option<SearchBackend>,

    /// `auto`, `always` or `never` [default: auto]
    #[structopt(long)]
    pub color: Option<ColorMode>,

    /// TOML file with defaults for the options above [default: ROOT_DIR/.blame-todo.toml]
    #[structopt(long = "config", parse(from_os_str))]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub marker: Option<String>,
    pub oldest_first: Option<bool>,
    pub strict: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub search: Option<SearchBackend>,
    pub color: Option<ColorMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    Grep,
    Walk,
}

impl FromStr for SearchBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grep" => Ok(SearchBackend::Grep),
            "walk" => Ok(SearchBackend::Walk),
            _ => Err(anyhow!("unknown search backend `{}` (expected `grep` or `walk`)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            _ => Err(anyhow!("unknown color mode `{}` (expected `auto`, `always` or `never`)", s)),
        }
    }
}

/// Everything a run needs, after merging the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root_dir: PathBuf,
    pub marker: String,
    pub order: SortOrder,
    pub on_lookup_failure: LookupFailure,
    pub timeout: Duration,
    pub search: SearchBackend,
    pub color: ColorMode,
}

impl Config {
    pub fn from_opt(opt: Opt) -> anyhow::Result<Self> {
        let file = match &opt.config_file {
            Some(path) => load_file(path)?,
            None => {
                let implicit = opt.root_dir.join(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    load_file(&implicit)?
                } else {
                    FileConfig::default()
                }
            }
        };

        Config::merge(opt, file)
    }

    /// Command-line values win; the file fills in what was left out.
    pub fn merge(opt: Opt, file: FileConfig) -> anyhow::Result<Self> {
        let marker = opt
            .marker
            .or(file.marker)
            .unwrap_or_else(|| DEFAULT_MARKER.to_owned());
        if marker.is_empty() {
            return Err(anyhow!("the TODO marker must not be empty"));
        }

        let timeout_secs = opt
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(anyhow!(
                "the timeout must be between 1 and {} seconds, got {}",
                MAX_TIMEOUT_SECS,
                timeout_secs
            ));
        }

        Ok(Config {
            root_dir: opt.root_dir,
            marker,
            order: if opt.oldest_first || file.oldest_first.unwrap_or(false) {
                SortOrder::OldestFirst
            } else {
                SortOrder::NewestFirst
            },
            on_lookup_failure: if opt.strict || file.strict.unwrap_or(false) {
                LookupFailure::Abort
            } else {
                LookupFailure::Skip
            },
            timeout: Duration::from_secs(timeout_secs),
            search: opt.search.or(file.search).unwrap_or(SearchBackend::Grep),
            color: opt.color.or(file.color).unwrap_or(ColorMode::Auto),
        })
    }
}

fn load_file(path: &Path) -> anyhow::Result<FileConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

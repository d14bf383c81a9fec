use crate::context::{FileTypeRule, DEFAULT_SKIP_DIRS};
use crate::error::{ContextError, Result};
use crate::metrics::DEFAULT_TOP_N;
use crate::summarize::KnowledgeBaseOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REPO_CONFIG: &str = ".repodoc.toml";
pub const DEFAULT_OUTPUT: &str = "combined_docs.txt";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub output: Option<PathBuf>,
    pub gitignore: Option<PathBuf>,
    pub skip_dirs: Option<Vec<PathBuf>>,
    pub skip_files: Option<Vec<String>>,
    pub file_types: Option<Vec<FileTypeRule>>,
    pub shallow_exclude: Option<PathBuf>,
    pub encoding: Option<String>,
    pub top_n: Option<usize>,
    pub jobs: Option<usize>,
    #[serde(default)]
    pub summarize: SummarizeConfig,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct SummarizeConfig {
    pub command: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub max_chars: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl SummarizeConfig {
    pub fn merge(&mut self, other: SummarizeConfig) {
        if other.command.is_some() {
            self.command = other.command;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.max_chars.is_some() {
            self.max_chars = other.max_chars;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    pub fn options(&self) -> KnowledgeBaseOptions {
        let defaults = KnowledgeBaseOptions::default();
        KnowledgeBaseOptions {
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            max_chars: self.max_chars.unwrap_or(defaults.max_chars),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

impl Config {
    pub fn merge(&mut self, other: Config) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.gitignore.is_some() {
            self.gitignore = other.gitignore;
        }
        if other.skip_dirs.is_some() {
            self.skip_dirs = other.skip_dirs;
        }
        if other.skip_files.is_some() {
            self.skip_files = other.skip_files;
        }
        if other.file_types.is_some() {
            self.file_types = other.file_types;
        }
        if other.shallow_exclude.is_some() {
            self.shallow_exclude = other.shallow_exclude;
        }
        if other.encoding.is_some() {
            self.encoding = other.encoding;
        }
        if other.top_n.is_some() {
            self.top_n = other.top_n;
        }
        if other.jobs.is_some() {
            self.jobs = other.jobs;
        }
        self.summarize.merge(other.summarize);
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ContextError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn skip_dirs_or_default(&self) -> Vec<PathBuf> {
        self.skip_dirs
            .clone()
            .unwrap_or_else(|| DEFAULT_SKIP_DIRS.iter().map(PathBuf::from).collect())
    }

    pub fn top_n_or_default(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    /// Ignore file to use: the configured one (relative to `root`) or
    /// `<root>/.gitignore`.
    pub fn gitignore_path(&self, root: &Path) -> PathBuf {
        match &self.gitignore {
            Some(p) => root.join(p),
            None => root.join(".gitignore"),
        }
    }
}

fn merge_optional(config: &mut Config, path: &Path) {
    if !path.is_file() {
        return;
    }
    match Config::from_file(path) {
        Ok(found) => {
            tracing::debug!(path = %path.display(), "loaded config");
            config.merge(found);
        }
        Err(e) => tracing::warn!("skipping config: {}", e),
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".repodoc").join("config.toml"))
}

/// Layered config: `~/.repodoc/config.toml`, then either `explicit` or
/// `<root>/.repodoc.toml`. An explicit file must parse.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    load_layers(global_config_path().as_deref(), root, explicit)
}

pub fn load_layers(global: Option<&Path>, root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // 1. Load global config
    if let Some(path) = global {
        merge_optional(&mut config, path);
    }

    // 2. Load repo config: explicit file or .repodoc.toml at the root
    match explicit {
        Some(path) => config.merge(Config::from_file(path)?),
        None => merge_optional(&mut config, &root.join(REPO_CONFIG)),
    }

    Ok(config)
}

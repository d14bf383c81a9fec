//! Run-wide, read-only selection settings.

use crate::error::{ContextError, Result};
use crate::ignore::IgnoreFn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_SKIP_DIRS: &[&str] = &["venv", ".git", "notes", "archive"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[serde(alias = "endswith")]
    Suffix,
    #[serde(alias = "equals")]
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeRule {
    #[serde(rename = "match")]
    pub pattern: String,
    #[serde(rename = "match_type")]
    pub kind: MatchKind,
}

impl FileTypeRule {
    pub fn suffix(pattern: impl Into<String>) -> Self {
        FileTypeRule {
            pattern: pattern.into(),
            kind: MatchKind::Suffix,
        }
    }

    pub fn exact(pattern: impl Into<String>) -> Self {
        FileTypeRule {
            pattern: pattern.into(),
            kind: MatchKind::Exact,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self.kind {
            MatchKind::Suffix => name.ends_with(&self.pattern),
            MatchKind::Exact => name == self.pattern,
        }
    }
}

/// Everything the classifier needs, resolved once. All stored paths are
/// canonical so equality and prefix checks compare like with like.
pub struct RootContext {
    root: PathBuf,
    skip_dirs: Vec<PathBuf>,
    skip_files: HashSet<String>,
    file_types: Vec<FileTypeRule>,
    shallow_exclude: Option<PathBuf>,
    is_ignored: IgnoreFn,
}

impl RootContext {
    pub fn builder(root: impl Into<PathBuf>) -> RootContextBuilder {
        RootContextBuilder {
            root: root.into(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(PathBuf::from).collect(),
            skip_files: HashSet::new(),
            file_types: Vec::new(),
            shallow_exclude: None,
            is_ignored: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn skip_dirs(&self) -> &[PathBuf] {
        &self.skip_dirs
    }

    pub fn skip_files(&self) -> &HashSet<String> {
        &self.skip_files
    }

    pub fn file_types(&self) -> &[FileTypeRule] {
        &self.file_types
    }

    pub fn shallow_exclude(&self) -> Option<&Path> {
        self.shallow_exclude.as_deref()
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        (self.is_ignored)(path)
    }

    /// Root-relative path with forward slashes, as printed in the document.
    pub fn relative_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

pub struct RootContextBuilder {
    root: PathBuf,
    skip_dirs: Vec<PathBuf>,
    skip_files: HashSet<String>,
    file_types: Vec<FileTypeRule>,
    shallow_exclude: Option<PathBuf>,
    is_ignored: Option<IgnoreFn>,
}

impl RootContextBuilder {
    /// Replace the skip directories. Relative entries resolve against the root.
    pub fn skip_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.skip_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_files = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_types(mut self, rules: Vec<FileTypeRule>) -> Self {
        self.file_types = rules;
        self
    }

    pub fn shallow_exclude(mut self, dir: Option<PathBuf>) -> Self {
        self.shallow_exclude = dir;
        self
    }

    pub fn ignore_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.is_ignored = Some(Arc::new(f));
        self
    }

    pub fn ignore_fn(mut self, f: IgnoreFn) -> Self {
        self.is_ignored = Some(f);
        self
    }

    pub fn build(self) -> Result<RootContext> {
        let meta = fs::metadata(&self.root)
            .map_err(|_| ContextError::RootNotFound(self.root.clone()))?;
        if !meta.is_dir() {
            return Err(ContextError::RootNotDirectory(self.root));
        }
        let root = fs::canonicalize(&self.root)?;

        let skip_dirs = self
            .skip_dirs
            .iter()
            .map(|d| canonicalize_lossy(&root.join(d)))
            .collect();
        let shallow_exclude = self
            .shallow_exclude
            .as_ref()
            .map(|d| canonicalize_lossy(&root.join(d)));

        Ok(RootContext {
            root,
            skip_dirs,
            skip_files: self.skip_files,
            file_types: self.file_types,
            shallow_exclude,
            is_ignored: self.is_ignored.unwrap_or_else(|| Arc::new(|_: &Path| false)),
        })
    }
}

/// Canonicalize a path that may not exist yet: resolve the deepest existing
/// ancestor and append the remaining components, with `.`/`..` folded.
pub fn canonicalize_lossy(path: &Path) -> PathBuf {
    if let Ok(p) = fs::canonicalize(path) {
        return p;
    }

    let normalized = normalize(path);
    let mut existing = normalized.as_path();
    let mut rest = Vec::new();
    while let Some(parent) = existing.parent() {
        if let Some(name) = existing.file_name() {
            rest.push(name.to_os_string());
        }
        existing = parent;
        if let Ok(base) = fs::canonicalize(existing) {
            return rest.iter().rev().fold(base, |acc, part| acc.join(part));
        }
    }
    normalized
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rule_matching() {
        assert!(FileTypeRule::suffix(".ts").matches("index.ts"));
        assert!(!FileTypeRule::suffix(".ts").matches("index.tsx"));
        assert!(FileTypeRule::exact("Dockerfile").matches("Dockerfile"));
        assert!(!FileTypeRule::exact("Dockerfile").matches("Dockerfile.dev"));
    }

    #[test]
    fn test_rule_parses_match_type_aliases() {
        let rule: FileTypeRule =
            toml::from_str("match = \".py\"\nmatch_type = \"endswith\"").unwrap();
        assert_eq!(rule, FileTypeRule::suffix(".py"));

        let rule: FileTypeRule =
            toml::from_str("match = \"Makefile\"\nmatch_type = \"exact\"").unwrap();
        assert_eq!(rule, FileTypeRule::exact("Makefile"));
    }

    #[test]
    fn test_missing_root() {
        let dir = tempdir().unwrap();
        let err = RootContext::builder(dir.path().join("nope")).build();
        assert!(matches!(err, Err(ContextError::RootNotFound(_))));
    }

    #[test]
    fn test_skip_dirs_are_canonical() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();

        let ctx = RootContext::builder(dir.path())
            .skip_dirs(["./vendor", "missing/deeper"])
            .build()
            .unwrap();

        let root = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(ctx.skip_dirs()[0], root.join("vendor"));
        assert_eq!(ctx.skip_dirs()[1], root.join("missing").join("deeper"));
    }

    #[test]
    fn test_canonicalize_lossy_folds_parent_dirs() {
        let dir = tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let got = canonicalize_lossy(&root.join("a/../b/c"));
        assert_eq!(got, root.join("b").join("c"));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let dir = tempdir().unwrap();
        let ctx = RootContext::builder(dir.path()).build().unwrap();
        let file = ctx.root().join("src").join("lib.rs");
        assert_eq!(ctx.relative_path(&file), "src/lib.rs");
    }
}

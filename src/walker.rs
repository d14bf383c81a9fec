//! Single depth-first pass over the root that decides the inclusion set and
//! fills the token cache.

use crate::classify::PathClassifier;
use crate::context::RootContext;
use crate::error::{ContextError, Result};
use crate::reader;
use crate::tokens::{TokenCache, TokenCounter};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative: String,
}

impl FileEntry {
    pub fn name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

#[derive(Debug)]
pub struct WalkOutcome {
    pub files: Vec<FileEntry>,
    pub tokens: TokenCache,
}

/// One child of a listed directory. Only real directories (not symlinks to
/// directories) are `Directory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory { name: String, path: PathBuf },
    File { name: String, path: PathBuf },
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Directory { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Node::Directory { path, .. } | Node::File { path, .. } => path,
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }
}

/// List a directory: directories first, then files, each group ordered by
/// case-insensitive name. Shared by the walker and the renderer so both see
/// the same children in the same order.
pub fn list_children(dir: &Path) -> io::Result<Vec<Node>> {
    let mut nodes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "skipping unreadable entry: {}", e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        nodes.push(if is_dir {
            Node::Directory { name, path }
        } else {
            Node::File { name, path }
        });
    }
    nodes.sort_by(compare_nodes);
    Ok(nodes)
}

fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

pub struct TreeWalker<'a> {
    classifier: PathClassifier<'a>,
    jobs: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(ctx: &'a RootContext) -> Self {
        TreeWalker {
            classifier: PathClassifier::new(ctx),
            jobs: 1,
        }
    }

    /// Worker threads for token counting; 0 picks the number of CPUs.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        self
    }

    pub fn walk(&self, counter: &dyn TokenCounter) -> Result<WalkOutcome> {
        let ctx = self.classifier.context();
        let root = ctx.root();
        let children = list_children(root).map_err(|source| ContextError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        self.visit(children, &mut files);
        tracing::debug!(files = files.len(), "walk complete");

        let costs = self.measure(&files, counter);
        let mut tokens = TokenCache::new();
        for (entry, cost) in files.iter().zip(costs) {
            tokens.get_or_compute(&entry.path, || cost);
        }

        Ok(WalkOutcome { files, tokens })
    }

    fn visit(&self, children: Vec<Node>, files: &mut Vec<FileEntry>) {
        let ctx = self.classifier.context();
        let (dirs, leaves): (Vec<Node>, Vec<Node>) =
            children.into_iter().partition(Node::is_dir);

        for dir in dirs {
            let path = dir.path();
            if !self.classifier.classify_directory(path).is_included() {
                continue;
            }
            match list_children(path) {
                Ok(grandchildren) => self.visit(grandchildren, files),
                Err(e) => {
                    tracing::warn!(dir = %path.display(), "abandoning subtree: {}", e);
                }
            }
        }

        for leaf in leaves {
            let path = leaf.path();
            if self.classifier.classify_file(path).is_included() {
                files.push(FileEntry {
                    path: path.to_path_buf(),
                    relative: ctx.relative_path(path),
                });
            }
        }
    }

    fn measure(&self, files: &[FileEntry], counter: &dyn TokenCounter) -> Vec<usize> {
        if self.jobs > 1 && files.len() > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
                Ok(pool) => {
                    return pool.install(|| {
                        files
                            .par_iter()
                            .map(|f| file_cost(&f.path, counter))
                            .collect()
                    });
                }
                Err(e) => tracing::warn!("thread pool unavailable, counting serially: {}", e),
            }
        }
        files.iter().map(|f| file_cost(&f.path, counter)).collect()
    }
}

/// Cost of one file's document text. Unreadable files cost nothing.
pub fn file_cost(path: &Path, counter: &dyn TokenCounter) -> usize {
    match reader::document_text(path) {
        Ok(text) => counter.count(&text),
        Err(e) => {
            tracing::warn!("{}; counting 0 tokens", e);
            0
        }
    }
}

//! Box-drawing tree of the included entries, annotated with token costs.

use crate::classify::PathClassifier;
use crate::context::RootContext;
use crate::tokens::TokenCache;
use crate::walker::{list_children, Node};
use serde::Serialize;
use std::fmt;
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_PREFIX: &str = "│   ";
const SPACE_PREFIX: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineKind {
    Directory,
    File { tokens: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    /// Indentation and connector, e.g. `│   └── `.
    #[serde(skip)]
    pub prefix: String,
    pub name: String,
    /// Root-relative path with forward slashes.
    pub path: String,
    #[serde(flatten)]
    pub kind: LineKind,
}

impl TreeLine {
    pub fn label(&self) -> String {
        match self.kind {
            LineKind::Directory => format!("{}/", self.name),
            LineKind::File { .. } => self.name.clone(),
        }
    }

    pub fn annotation(&self) -> Option<String> {
        match self.kind {
            LineKind::Directory => None,
            LineKind::File { tokens: Some(n) } => Some(format!("({} tokens)", n)),
            LineKind::File { tokens: None } => Some("(cost unavailable)".to_string()),
        }
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.label())?;
        if let Some(note) = self.annotation() {
            write!(f, " {}", note)?;
        }
        Ok(())
    }
}

pub struct TreeRenderer<'a> {
    classifier: PathClassifier<'a>,
    tokens: &'a TokenCache,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(ctx: &'a RootContext, tokens: &'a TokenCache) -> Self {
        TreeRenderer {
            classifier: PathClassifier::new(ctx),
            tokens,
        }
    }

    /// Lines for everything below the root; the root itself is not printed.
    pub fn render(&self) -> Vec<TreeLine> {
        let mut lines = Vec::new();
        self.render_dir(self.classifier.context().root(), "", &mut lines);
        lines
    }

    fn render_dir(&self, dir: &Path, prefix: &str, lines: &mut Vec<TreeLine>) {
        let children = match list_children(dir) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "cannot list directory for tree: {}", e);
                return;
            }
        };
        self.render_children(children, prefix, lines);
    }

    fn render_children(&self, children: Vec<Node>, prefix: &str, lines: &mut Vec<TreeLine>) {
        let visible: Vec<Node> = children
            .into_iter()
            .filter(|node| match node {
                Node::Directory { path, .. } => {
                    self.classifier.classify_directory(path).is_included()
                }
                Node::File { path, .. } => self.classifier.classify_file(path).is_included(),
            })
            .collect();

        let ctx = self.classifier.context();
        let count = visible.len();
        for (i, node) in visible.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            let path = node.path();
            let kind = match node {
                Node::Directory { .. } => LineKind::Directory,
                Node::File { .. } => {
                    let tokens = self.tokens.get(path);
                    if tokens.is_none() {
                        tracing::warn!(path = %path.display(), "no cached token cost");
                    }
                    LineKind::File { tokens }
                }
            };
            let is_dir = kind == LineKind::Directory;

            lines.push(TreeLine {
                prefix: format!("{}{}", prefix, connector),
                name: node.name().to_string(),
                path: ctx.relative_path(path),
                kind,
            });

            if is_dir {
                let extension = if is_last { SPACE_PREFIX } else { PIPE_PREFIX };
                self.render_dir(path, &format!("{}{}", prefix, extension), lines);
            }
        }
    }
}

/// Plain-text form, one line per entry.
pub fn to_text(lines: &[TreeLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FileTypeRule;
    use crate::tokens::TokenCounter;
    use crate::walker::TreeWalker;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count(&self, text: &str) -> usize {
            text.chars().count()
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, content).unwrap();
    }

    fn project() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        write(&root, "Banana.ts", "bb");
        write(&root, "Cherry.ts", "ccc");
        write(&root, "apple/a.ts", "a");
        write(&root, "apple/z/deep.ts", "dddd");
        write(&root, ".git/HEAD.ts", "ref");
        (dir, root)
    }

    fn ts_context(root: &Path) -> RootContext {
        RootContext::builder(root)
            .file_types(vec![FileTypeRule::suffix(".ts")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_layout() {
        let (_dir, root) = project();
        let ctx = ts_context(&root);
        let outcome = TreeWalker::new(&ctx).walk(&CharCounter).unwrap();
        let lines = TreeRenderer::new(&ctx, &outcome.tokens).render();

        let expected = "\
├── apple/
│   ├── z/
│   │   └── deep.ts (4 tokens)
│   └── a.ts (1 tokens)
├── Banana.ts (2 tokens)
└── Cherry.ts (3 tokens)";
        assert_eq!(to_text(&lines), expected);
    }

    #[test]
    fn test_skipped_dir_never_rendered() {
        let (_dir, root) = project();
        let ctx = ts_context(&root);
        let outcome = TreeWalker::new(&ctx).walk(&CharCounter).unwrap();
        let lines = TreeRenderer::new(&ctx, &outcome.tokens).render();
        assert!(lines.iter().all(|l| !l.path.starts_with(".git")));
    }

    #[test]
    fn test_every_included_file_rendered_once_with_same_cost() {
        let (_dir, root) = project();
        let ctx = ts_context(&root);
        let outcome = TreeWalker::new(&ctx).walk(&CharCounter).unwrap();
        let lines = TreeRenderer::new(&ctx, &outcome.tokens).render();

        for file in &outcome.files {
            let matching: Vec<_> = lines.iter().filter(|l| l.path == file.relative).collect();
            assert_eq!(matching.len(), 1, "{}", file.relative);
            assert_eq!(
                matching[0].kind,
                LineKind::File {
                    tokens: outcome.tokens.get(&file.path)
                }
            );
        }
    }

    #[test]
    fn test_missing_cost_is_marked() {
        let (_dir, root) = project();
        let ctx = ts_context(&root);
        let empty = TokenCache::new();
        let text = to_text(&TreeRenderer::new(&ctx, &empty).render());
        assert!(text.contains("Banana.ts (cost unavailable)"));
    }

    #[test]
    fn test_unlistable_subdirectory_renders_empty() {
        let (_dir, root) = project();
        let ctx = ts_context(&root);
        let outcome = TreeWalker::new(&ctx).walk(&CharCounter).unwrap();
        let renderer = TreeRenderer::new(&ctx, &outcome.tokens);

        // a "directory" that is really a file: shown, but listing it fails
        let children = vec![
            Node::Directory {
                name: "Banana.ts".to_string(),
                path: root.join("Banana.ts"),
            },
            Node::File {
                name: "Cherry.ts".to_string(),
                path: root.join("Cherry.ts"),
            },
        ];
        let mut lines = Vec::new();
        renderer.render_children(children, "", &mut lines);

        assert_eq!(to_text(&lines), "├── Banana.ts/\n└── Cherry.ts (3 tokens)");
    }

    #[test]
    fn test_empty_root_renders_nothing() {
        let dir = tempdir().unwrap();
        let ctx = RootContext::builder(dir.path()).build().unwrap();
        let cache = TokenCache::new();
        assert!(TreeRenderer::new(&ctx, &cache).render().is_empty());
    }
}

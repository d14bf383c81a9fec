use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

/// Ignore predicate handed to the classifier. A path ending in a separator
/// asks about the directory form of the path.
pub type IgnoreFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

pub struct IgnorePatterns {
    matcher: Option<Gitignore>,
}

impl IgnorePatterns {
    pub fn none() -> Self {
        IgnorePatterns { matcher: None }
    }

    /// Load a gitignore-style file. Patterns are anchored at the file's
    /// directory. A missing or unparsable file ignores nothing.
    pub fn load(path: &Path) -> Self {
        match Self::parse_file(path) {
            Ok(matcher) => {
                tracing::debug!(
                    path = %path.display(),
                    patterns = matcher.num_ignores(),
                    "loaded ignore patterns"
                );
                IgnorePatterns {
                    matcher: Some(matcher),
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignore file unusable, nothing is ignored: {}", e);
                Self::none()
            }
        }
    }

    fn parse_file(path: &Path) -> Result<Gitignore, ignore::Error> {
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let base = std::fs::canonicalize(&base).unwrap_or(base);

        let mut builder = GitignoreBuilder::new(&base);
        if let Some(err) = builder.add(path) {
            return Err(err);
        }
        builder.build()
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };

        let raw = path.as_os_str().to_string_lossy();
        let is_dir = raw.ends_with(MAIN_SEPARATOR) || raw.ends_with('/');
        let trimmed = Path::new(raw.trim_end_matches(['/', MAIN_SEPARATOR]));

        if trimmed.starts_with(matcher.path()) {
            matcher
                .matched_path_or_any_parents(trimmed, is_dir)
                .is_ignore()
        } else {
            matcher.matched(trimmed, is_dir).is_ignore()
        }
    }

    pub fn into_predicate(self) -> IgnoreFn {
        Arc::new(move |path: &Path| self.is_ignored(path))
    }
}

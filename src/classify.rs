//! Inclusion rules for a single filesystem entry.
//!
//! Directories default to traversable; files default to excluded unless
//! every rule lets them through.

use crate::context::RootContext;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Include,
    Exclude(ExcludeReason),
}

impl Classification {
    pub fn is_included(self) -> bool {
        matches!(self, Classification::Include)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeReason {
    Ignored,
    SkipDir,
    SkipAncestor,
    Unresolvable,
    SkipName,
    ShallowExclude,
    FileType,
    NotRegularFile,
}

pub struct PathClassifier<'a> {
    ctx: &'a RootContext,
}

impl<'a> PathClassifier<'a> {
    pub fn new(ctx: &'a RootContext) -> Self {
        PathClassifier { ctx }
    }

    pub fn context(&self) -> &'a RootContext {
        self.ctx
    }

    pub fn classify_directory(&self, path: &Path) -> Classification {
        let result = self.directory_rules(path);
        if let Classification::Exclude(reason) = result {
            tracing::trace!(path = %path.display(), ?reason, "directory excluded");
        }
        result
    }

    fn directory_rules(&self, path: &Path) -> Classification {
        if self.ctx.is_ignored(path) || self.ctx.is_ignored(&with_trailing_separator(path)) {
            return Classification::Exclude(ExcludeReason::Ignored);
        }

        let canonical = match fs::canonicalize(path) {
            Ok(p) => p,
            Err(_) => return Classification::Exclude(ExcludeReason::Unresolvable),
        };
        if self.is_skip_dir_or_descendant(&canonical) {
            return Classification::Exclude(ExcludeReason::SkipDir);
        }

        if self.has_skipped_ancestor(path) {
            return Classification::Exclude(ExcludeReason::SkipAncestor);
        }

        Classification::Include
    }

    pub fn classify_file(&self, path: &Path) -> Classification {
        let result = self.file_rules(path);
        if let Classification::Exclude(reason) = result {
            tracing::trace!(path = %path.display(), ?reason, "file excluded");
        }
        result
    }

    fn file_rules(&self, path: &Path) -> Classification {
        if self.ctx.is_ignored(path) {
            return Classification::Exclude(ExcludeReason::Ignored);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // the walker never descends into a skip dir, but the root itself may be one
        let parent = path.parent().and_then(|p| fs::canonicalize(p).ok());
        if parent
            .as_deref()
            .is_some_and(|p| self.is_skip_dir_or_descendant(p))
        {
            return Classification::Exclude(ExcludeReason::SkipDir);
        }

        if self.ctx.skip_files().contains(&name) {
            return Classification::Exclude(ExcludeReason::SkipName);
        }

        if let Some(shallow) = self.ctx.shallow_exclude() {
            if parent.as_deref() == Some(shallow) {
                return Classification::Exclude(ExcludeReason::ShallowExclude);
            }
        }

        let rules = self.ctx.file_types();
        if !rules.is_empty() && !rules.iter().any(|r| r.matches(&name)) {
            return Classification::Exclude(ExcludeReason::FileType);
        }

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Classification::Include,
            _ => Classification::Exclude(ExcludeReason::NotRegularFile),
        }
    }

    fn is_skip_dir_or_descendant(&self, canonical: &Path) -> bool {
        // Path::starts_with compares whole components, so `/a/venv2` is not
        // under `/a/venv`.
        self.ctx
            .skip_dirs()
            .iter()
            .any(|skip| canonical.starts_with(skip))
    }

    /// Walk the lexical ancestors of `path` up to (not including) the root
    /// and check each one's canonical form against the skip set.
    fn has_skipped_ancestor(&self, path: &Path) -> bool {
        let root = self.ctx.root();
        let mut current: Option<&Path> = path.parent();
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            if let Ok(canonical) = fs::canonicalize(dir) {
                if self.ctx.skip_dirs().iter().any(|s| s == &canonical) {
                    return true;
                }
            }
            current = dir.parent();
        }
        false
    }
}

fn with_trailing_separator(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(std::path::MAIN_SEPARATOR_STR);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FileTypeRule;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, "x").unwrap();
        p
    }

    fn fixture() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_directories_default_to_included() {
        let (_dir, root) = fixture();
        fs::create_dir(root.join("src")).unwrap();
        let ctx = RootContext::builder(&root).build().unwrap();
        let c = PathClassifier::new(&ctx);
        assert_eq!(c.classify_directory(&root.join("src")), Classification::Include);
    }

    #[test]
    fn test_skip_dir_and_descendants() {
        let (_dir, root) = fixture();
        fs::create_dir_all(root.join("vendor/deep")).unwrap();
        fs::create_dir_all(root.join("vendored")).unwrap();
        let ctx = RootContext::builder(&root).skip_dirs(["vendor"]).build().unwrap();
        let c = PathClassifier::new(&ctx);

        assert_eq!(
            c.classify_directory(&root.join("vendor")),
            Classification::Exclude(ExcludeReason::SkipDir)
        );
        assert_eq!(
            c.classify_directory(&root.join("vendor/deep")),
            Classification::Exclude(ExcludeReason::SkipDir)
        );
        assert!(c.classify_directory(&root.join("vendored")).is_included());
    }

    #[test]
    fn test_root_as_skip_dir_excludes_root_files() {
        let (_dir, root) = fixture();
        let top = touch(&root, "main.rs");
        let nested = touch(&root, "src/lib.rs");
        let ctx = RootContext::builder(&root).skip_dirs(["."]).build().unwrap();
        let c = PathClassifier::new(&ctx);

        assert_eq!(
            c.classify_file(&top),
            Classification::Exclude(ExcludeReason::SkipDir)
        );
        assert_eq!(
            c.classify_file(&nested),
            Classification::Exclude(ExcludeReason::SkipDir)
        );
        assert!(!c.classify_directory(&root.join("src")).is_included());
    }

    #[test]
    fn test_nested_skip_path() {
        let (_dir, root) = fixture();
        fs::create_dir_all(root.join("src/components/ui")).unwrap();
        let ctx = RootContext::builder(&root)
            .skip_dirs(["src/components/ui"])
            .build()
            .unwrap();
        let c = PathClassifier::new(&ctx);

        assert!(c.classify_directory(&root.join("src/components")).is_included());
        assert!(!c.classify_directory(&root.join("src/components/ui")).is_included());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_into_skipped_dir_is_excluded() {
        let (_dir, root) = fixture();
        fs::create_dir_all(root.join("archive/old")).unwrap();
        std::os::unix::fs::symlink(root.join("archive/old"), root.join("shortcut")).unwrap();
        let ctx = RootContext::builder(&root).build().unwrap();
        let c = PathClassifier::new(&ctx);

        assert_eq!(
            c.classify_directory(&root.join("shortcut")),
            Classification::Exclude(ExcludeReason::SkipDir)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_lexical_ancestor_in_skip_set() {
        let (_dir, root) = fixture();
        fs::create_dir_all(root.join("elsewhere/inner")).unwrap();
        fs::create_dir_all(root.join("notes")).unwrap();
        std::os::unix::fs::symlink(root.join("elsewhere"), root.join("notes/link")).unwrap();
        let ctx = RootContext::builder(&root).build().unwrap();
        let c = PathClassifier::new(&ctx);

        // canonical form escapes `notes`, the lexical parent does not
        assert_eq!(
            c.classify_directory(&root.join("notes/link/inner")),
            Classification::Exclude(ExcludeReason::SkipAncestor)
        );
        assert!(c.classify_directory(&root.join("elsewhere/inner")).is_included());
    }

    #[test]
    fn test_ignored_directory_via_trailing_separator() {
        let (_dir, root) = fixture();
        fs::create_dir(root.join("build")).unwrap();
        let ctx = RootContext::builder(&root)
            .ignore_with(|p: &Path| p.to_string_lossy().ends_with("build/"))
            .build()
            .unwrap();
        let c = PathClassifier::new(&ctx);

        assert_eq!(
            c.classify_directory(&root.join("build")),
            Classification::Exclude(ExcludeReason::Ignored)
        );
    }

    #[test]
    fn test_file_type_rules() {
        let (_dir, root) = fixture();
        let ts = touch(&root, "index.ts");
        let json = touch(&root, "index.json");
        let readme = touch(&root, "README");
        let ctx = RootContext::builder(&root)
            .file_types(vec![FileTypeRule::suffix(".ts"), FileTypeRule::suffix(".tsx")])
            .build()
            .unwrap();
        let c = PathClassifier::new(&ctx);

        assert!(c.classify_file(&ts).is_included());
        assert_eq!(
            c.classify_file(&json),
            Classification::Exclude(ExcludeReason::FileType)
        );
        assert!(!c.classify_file(&readme).is_included());
    }

    #[test]
    fn test_empty_rules_pass_all_names() {
        let (_dir, root) = fixture();
        let f = touch(&root, "anything.bin");
        let ctx = RootContext::builder(&root).build().unwrap();
        assert!(PathClassifier::new(&ctx).classify_file(&f).is_included());
    }

    #[test]
    fn test_shallow_exclude_only_direct_children() {
        let (_dir, root) = fixture();
        let button = touch(&root, "components/Button.tsx");
        let input = touch(&root, "components/forms/Input.tsx");
        let ctx = RootContext::builder(&root)
            .shallow_exclude(Some(PathBuf::from("components")))
            .build()
            .unwrap();
        let c = PathClassifier::new(&ctx);

        assert_eq!(
            c.classify_file(&button),
            Classification::Exclude(ExcludeReason::ShallowExclude)
        );
        assert!(c.classify_file(&input).is_included());
        assert!(c.classify_directory(&root.join("components")).is_included());
    }

    #[test]
    fn test_skip_file_name() {
        let (_dir, root) = fixture();
        let lock = touch(&root, "sub/package-lock.json");
        let ctx = RootContext::builder(&root)
            .skip_files(["package-lock.json"])
            .build()
            .unwrap();
        assert_eq!(
            PathClassifier::new(&ctx).classify_file(&lock),
            Classification::Exclude(ExcludeReason::SkipName)
        );
    }

    #[test]
    fn test_ignore_beats_file_type() {
        let (_dir, root) = fixture();
        let f = touch(&root, "gen.ts");
        let ctx = RootContext::builder(&root)
            .file_types(vec![FileTypeRule::suffix(".ts")])
            .ignore_with(|p: &Path| p.ends_with("gen.ts"))
            .build()
            .unwrap();
        assert_eq!(
            PathClassifier::new(&ctx).classify_file(&f),
            Classification::Exclude(ExcludeReason::Ignored)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_not_a_file() {
        let (_dir, root) = fixture();
        std::os::unix::fs::symlink(root.join("gone.rs"), root.join("dangling.rs")).unwrap();
        let ctx = RootContext::builder(&root).build().unwrap();
        assert_eq!(
            PathClassifier::new(&ctx).classify_file(&root.join("dangling.rs")),
            Classification::Exclude(ExcludeReason::NotRegularFile)
        );
    }
}

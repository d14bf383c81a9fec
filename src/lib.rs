//! Select the files of a repository worth showing a language model, price
//! them in tokens, and pack them into one annotated document.

pub mod classify;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod ignore;
pub mod metrics;
pub mod notebook;
pub mod output;
pub mod reader;
pub mod render;
pub mod summarize;
pub mod tokens;
pub mod walker;

pub use classify::{Classification, ExcludeReason, PathClassifier};
pub use context::{FileTypeRule, MatchKind, RootContext};
pub use error::{ContextError, Result};
pub use self::ignore::IgnorePatterns;
pub use metrics::{aggregate, RepoMetrics};
pub use output::OutputFormat;
pub use render::{TreeLine, TreeRenderer};
pub use tokens::{Encoding, TokenCache, TokenCounter, Tokenizer};
pub use walker::{FileEntry, TreeWalker, WalkOutcome};

use crate::error::ContextError;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tiktoken_rs::CoreBPE;

lazy_static! {
    static ref CL100K: Option<CoreBPE> = tiktoken_rs::cl100k_base().ok();
    static ref O200K: Option<CoreBPE> = tiktoken_rs::o200k_base().ok();
}

/// Anything that can put a price on a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Supported encodings:
/// - "o200k_base"  (GPT-4o)
/// - "cl100k_base" (GPT-3.5/4)
/// - "heuristic"   (`len / 4`, no tables needed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Cl100kBase,
    O200kBase,
    Heuristic,
}

impl FromStr for Encoding {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Ok(Encoding::Cl100kBase),
            "o200k_base" | "o200k" => Ok(Encoding::O200kBase),
            "heuristic" => Ok(Encoding::Heuristic),
            _ => Err(ContextError::UnknownEncoding(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    encoding: Encoding,
}

impl Tokenizer {
    /// If the BPE tables for `encoding` cannot be loaded, counting falls back
    /// to the heuristic rather than failing the run.
    pub fn new(encoding: Encoding) -> Self {
        let usable = match encoding {
            Encoding::Cl100kBase => CL100K.is_some(),
            Encoding::O200kBase => O200K.is_some(),
            Encoding::Heuristic => true,
        };
        if usable {
            Tokenizer { encoding }
        } else {
            tracing::warn!(?encoding, "tokenizer tables unavailable, using heuristic counts");
            Tokenizer {
                encoding: Encoding::Heuristic,
            }
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl TokenCounter for Tokenizer {
    fn count(&self, text: &str) -> usize {
        count_tokens(text, self.encoding)
    }
}

/// Count tokens for given text using the chosen encoding.
pub fn count_tokens(text: &str, encoding: Encoding) -> usize {
    let bpe = match encoding {
        Encoding::Cl100kBase => CL100K.as_ref(),
        Encoding::O200kBase => O200K.as_ref(),
        Encoding::Heuristic => None,
    };
    match bpe {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => fallback_tokens(text),
    }
}

#[inline]
fn fallback_tokens(text: &str) -> usize {
    // 1 token ≈ 4 characters, rounded up
    (text.len() + 3) / 4
}

/// Token cost per included file, filled once by the walker and then only
/// read. Keys are absolute paths under the canonical root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCache {
    costs: HashMap<PathBuf, usize>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cost. A key is written once; a second write keeps the first
    /// value and is logged.
    pub fn insert(&mut self, path: PathBuf, cost: usize) {
        if let Some(existing) = self.costs.get(&path) {
            tracing::warn!(
                path = %path.display(),
                existing,
                rejected = cost,
                "token cost already recorded"
            );
            return;
        }
        self.costs.insert(path, cost);
    }

    pub fn get_or_compute<F>(&mut self, path: &Path, compute: F) -> usize
    where
        F: FnOnce() -> usize,
    {
        *self
            .costs
            .entry(path.to_path_buf())
            .or_insert_with(compute)
    }

    pub fn get(&self, path: &Path) -> Option<usize> {
        self.costs.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn total(&self) -> usize {
        self.costs.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hello_world_count() {
        let tokens = count_tokens("hello world", Encoding::Cl100kBase);
        // cl100k_base encodes to 2 tokens. Allow ±1 tolerance.
        assert!((1..=3).contains(&tokens), "expected 1-3 tokens, got {}", tokens);
    }

    #[test]
    fn heuristic_rounds_up() {
        assert_eq!(count_tokens("", Encoding::Heuristic), 0);
        assert_eq!(count_tokens("abc", Encoding::Heuristic), 1);
        assert_eq!(count_tokens("abcde", Encoding::Heuristic), 2);
    }

    #[test]
    fn encoding_names() {
        assert_eq!("cl100k_base".parse::<Encoding>().unwrap(), Encoding::Cl100kBase);
        assert_eq!("O200K_BASE".parse::<Encoding>().unwrap(), Encoding::O200kBase);
        assert!("p50k".parse::<Encoding>().is_err());
    }

    #[test]
    fn cache_keeps_first_write() {
        let mut cache = TokenCache::new();
        cache.insert(PathBuf::from("/r/a.rs"), 10);
        cache.insert(PathBuf::from("/r/a.rs"), 99);
        assert_eq!(cache.get(Path::new("/r/a.rs")), Some(10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_get_or_compute_runs_once() {
        let mut cache = TokenCache::new();
        let mut calls = 0;
        let first = cache.get_or_compute(Path::new("/r/b.rs"), || {
            calls += 1;
            7
        });
        let second = cache.get_or_compute(Path::new("/r/b.rs"), || {
            calls += 1;
            8
        });
        assert_eq!((first, second, calls), (7, 7, 1));
        assert_eq!(cache.total(), 7);
        assert_eq!(cache.get(Path::new("/r/missing.rs")), None);
    }

    proptest! {
        #[test]
        fn token_bounds(s in "[a-zA-Z0-9 ]{0,200}") {
            let byte_len = s.len();
            let tokens = count_tokens(&s, Encoding::Cl100kBase);
            prop_assert!(tokens >= byte_len / 6, "too small: {} vs {}", tokens, byte_len);
            prop_assert!(tokens <= byte_len * 2 + 1, "too big: {} vs {}", tokens, byte_len);
        }
    }
}

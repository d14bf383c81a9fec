use crate::tokens::TokenCache;
use crate::walker::FileEntry;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStats {
    pub count: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedFile {
    pub path: String,
    pub tokens: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoMetrics {
    pub total_files: usize,
    pub total_tokens: usize,
    pub per_extension: BTreeMap<String, ExtensionStats>,
    pub top_files: Vec<RankedFile>,
}

/// `.rs` for `main.rs`, the whole name for `Dockerfile` or `.bashrc`.
pub fn extension_key(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 && !name[..idx].chars().all(|c| c == '.') => name[idx..].to_string(),
        _ => name.to_string(),
    }
}

pub fn aggregate(files: &[FileEntry], tokens: &TokenCache, top_n: usize) -> RepoMetrics {
    let mut metrics = RepoMetrics::default();
    let mut ranked = Vec::with_capacity(files.len());

    for file in files {
        let cost = tokens.get(&file.path);
        if cost.is_none() {
            tracing::warn!(path = %file.relative, "token cost unavailable");
        }

        metrics.total_files += 1;
        let ext = metrics
            .per_extension
            .entry(extension_key(file.name()))
            .or_default();
        ext.count += 1;

        if let Some(cost) = cost {
            metrics.total_tokens += cost;
            ext.tokens += cost;
            ranked.push(RankedFile {
                path: file.relative.clone(),
                tokens: cost,
            });
        }
    }

    ranked.sort_by(|a, b| b.tokens.cmp(&a.tokens).then_with(|| a.path.cmp(&b.path)));
    ranked.truncate(top_n);
    metrics.top_files = ranked;
    metrics
}

use super::{StatsOutput, TreeOutput};

pub fn render_tree(data: &TreeOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

pub fn render_stats(data: &StatsOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{RankedFile, RepoMetrics};
    use crate::render::{LineKind, TreeLine};

    #[test]
    fn test_tree_entries_carry_kind_and_tokens() {
        let lines = vec![
            TreeLine {
                prefix: "├── ".to_string(),
                name: "src".to_string(),
                path: "src".to_string(),
                kind: LineKind::Directory,
            },
            TreeLine {
                prefix: "│   └── ".to_string(),
                name: "lib.rs".to_string(),
                path: "src/lib.rs".to_string(),
                kind: LineKind::File { tokens: Some(12) },
            },
        ];
        let out = render_tree(&TreeOutput {
            project: "demo".to_string(),
            entries: &lines,
        })
        .unwrap();

        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["project"], "demo");
        assert_eq!(v["entries"][0]["kind"], "directory");
        assert_eq!(v["entries"][1]["path"], "src/lib.rs");
        assert_eq!(v["entries"][1]["tokens"], 12);
        assert!(v["entries"][1].get("prefix").is_none());
    }

    #[test]
    fn test_stats_flattened() {
        let metrics = RepoMetrics {
            total_files: 1,
            total_tokens: 9,
            top_files: vec![RankedFile {
                path: "a.rs".to_string(),
                tokens: 9,
            }],
            ..RepoMetrics::default()
        };
        let out = render_stats(&StatsOutput {
            project: "demo".to_string(),
            metrics: &metrics,
        })
        .unwrap();

        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["total_tokens"], 9);
        assert_eq!(v["top_files"][0]["path"], "a.rs");
    }
}

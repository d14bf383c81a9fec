use crate::cli::InitArgs;
use repodoc::config::REPO_CONFIG;
use std::fs;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"# repodoc settings for this repository.
# Command-line flags override everything here.

# Directories never descended into, relative to this file.
skip_dirs = ["venv", ".git", "notes", "archive", "node_modules", "target"]

# File names never included, wherever they appear.
skip_files = ["package-lock.json", "Cargo.lock", "yarn.lock", "combined_docs.txt"]

# Files directly inside this directory are left out; its subdirectories are not.
# shallow_exclude = "src/components"

# gitignore = ".gitignore"
# output = "combined_docs.txt"
# encoding = "cl100k_base"
top_n = 5

# Only files matching one of these rules are included. Remove them all to
# include every file.
[[file_types]]
match = ".rs"
match_type = "suffix"

[[file_types]]
match = ".py"
match_type = "suffix"

[[file_types]]
match = ".ts"
match_type = "suffix"

[[file_types]]
match = ".md"
match_type = "suffix"

[[file_types]]
match = ".toml"
match_type = "suffix"

[[file_types]]
match = "Dockerfile"
match_type = "exact"

[summarize]
# repodoc calls no model API itself. The knowledge base needs an external
# program that reads a prompt on stdin and prints the overview on stdout,
# such as the `llm` CLI (pip install llm; it reads OPENAI_API_KEY for
# OpenAI models like gpt-4o-mini).
# command = ["llm", "-m", "gpt-4o-mini"]
concurrency = 8
max_chars = 3000
timeout_secs = 120
"#;

pub fn run(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(REPO_CONFIG);

    if path.exists() && !args.force {
        return Err(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )
        .into());
    }

    fs::write(&path, DEFAULT_CONFIG)?;
    println!("Created {}", path.display());

    Ok(())
}

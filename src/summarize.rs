//! Knowledge-base mode: one short overview per included file.

use crate::error::{ContextError, Result};
use crate::reader;
use crate::walker::FileEntry;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_OUTPUT: &str = "combined-knowledge-base-overview.json";
pub const READ_FAILED: &str = "Error reading file.";
pub const SUMMARY_FAILED: &str = "Error generating overview.";

const PROMPT_HEADER: &str = "Please provide a concise overview of the following file content \
that will help an AI system determine its relevance to achieving its goals. \
Focus on summarizing the purpose and key details.";

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("summarizer i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("summarizer returned no text")]
    Empty,

    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),
}

pub trait Summarizer: Send + Sync + 'static {
    fn summarize(
        &self,
        prompt: String,
    ) -> impl Future<Output = std::result::Result<String, SummarizeError>> + Send;
}

/// Runs an external program with the prompt on stdin and takes its stdout
/// as the summary.
#[derive(Debug, Clone)]
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
}

impl CommandSummarizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandSummarizer {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace: `"llm -m gpt-4o-mini"`.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Summarizer for CommandSummarizer {
    async fn summarize(&self, prompt: String) -> std::result::Result<String, SummarizeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SummarizeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // a program that exits without reading its input is judged by its exit status
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SummarizeError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(SummarizeError::Empty);
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KnowledgeBaseOptions {
    pub concurrency: usize,
    pub max_chars: usize,
    pub timeout: Duration,
}

impl Default for KnowledgeBaseOptions {
    fn default() -> Self {
        KnowledgeBaseOptions {
            concurrency: 8,
            max_chars: 3000,
            timeout: Duration::from_secs(120),
        }
    }
}

pub fn build_prompt(content: &str, max_chars: usize) -> String {
    let excerpt: String = content.chars().take(max_chars).collect();
    format!("{}\n\n{}", PROMPT_HEADER, excerpt)
}

/// Summarize every file concurrently. Every input file gets an entry; failures
/// are recorded as fixed error strings.
pub async fn build_knowledge_base<S: Summarizer>(
    files: &[FileEntry],
    summarizer: Arc<S>,
    opts: KnowledgeBaseOptions,
) -> BTreeMap<String, String> {
    let permits = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for file in files {
        let path = file.path.clone();
        let relative = file.relative.clone();
        let summarizer = Arc::clone(&summarizer);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (relative, SUMMARY_FAILED.to_string());
            };

            let content =
                match tokio::task::spawn_blocking(move || reader::document_text(&path)).await {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        tracing::warn!("{}", e);
                        return (relative, READ_FAILED.to_string());
                    }
                    Err(e) => {
                        tracing::warn!(path = %relative, "read task failed: {}", e);
                        return (relative, READ_FAILED.to_string());
                    }
                };

            let prompt = build_prompt(&content, opts.max_chars);
            let result = match tokio::time::timeout(opts.timeout, summarizer.summarize(prompt)).await
            {
                Ok(r) => r,
                Err(_) => Err(SummarizeError::Timeout(opts.timeout)),
            };

            match result {
                Ok(summary) => {
                    tracing::debug!(path = %relative, "summarized");
                    (relative, summary)
                }
                Err(e) => {
                    tracing::warn!(path = %relative, "summary failed: {}", e);
                    (relative, SUMMARY_FAILED.to_string())
                }
            }
        });
    }

    let mut overview = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, summary)) => {
                overview.insert(path, summary);
            }
            Err(e) => tracing::error!("summary task panicked: {}", e),
        }
    }
    overview
}

pub fn write_knowledge_base(path: &Path, overview: &BTreeMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(overview)?;
    std::fs::write(path, json).map_err(|source| ContextError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), entries = overview.len(), "knowledge base written");
    Ok(())
}

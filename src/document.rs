//! The combined output document.

use crate::error::{ContextError, Result};
use crate::metrics::RepoMetrics;
use crate::reader;
use crate::render::TreeLine;
use crate::walker::FileEntry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const RULE: &str = "================================================================";
const FILE_RULE: &str = "================";

const INTRODUCTION: &str = "\
****** DOCUMENT INTRODUCTION ******

This file is a merged representation of the entire codebase, combining all repository files into a single document.
";

const SUMMARY: &str = "\
Purpose:
--------
This file contains a packed representation of the entire repository's contents.
It is designed to be easily consumable by AI systems for analysis, code review,
or other automated processes.

File Format:
------------
The content is organized as follows:
1. This summary section
2. Repository metrics
3. Repository structure
4. Multiple file entries, each consisting of:
  a. A separator line (================)
  b. The file path (File: path/to/file)
  c. Another separator line
  d. The full contents of the file
  e. A blank line

";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub files_written: usize,
    pub files_skipped: usize,
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    write!(out, "\n{}\n{}\n{}\n\n", RULE, title, RULE)
}

pub fn write_metrics<W: Write>(out: &mut W, metrics: &RepoMetrics, top_n: usize) -> io::Result<()> {
    writeln!(out, "Total Files (Non-Ignored): {}", metrics.total_files)?;
    writeln!(out, "Total Tokens: {}", metrics.total_tokens)?;
    writeln!(out, "Total Files by Type:")?;
    for (ext, stats) in &metrics.per_extension {
        writeln!(out, "    - {}: {} ({} tokens)", ext, stats.count, stats.tokens)?;
    }
    writeln!(out, "\nTop {} Files by Tokens:", top_n)?;
    for file in &metrics.top_files {
        writeln!(out, "    - {}: {} tokens", file.path, file.tokens)?;
    }
    Ok(())
}

/// Write all four sections. Files that cannot be read now are left out of
/// the content section and counted as skipped.
pub fn write_document<W: Write>(
    out: &mut W,
    metrics: &RepoMetrics,
    top_n: usize,
    tree: &[TreeLine],
    files: &[FileEntry],
) -> io::Result<DocumentStats> {
    out.write_all(INTRODUCTION.as_bytes())?;
    section(out, "File Summary")?;
    out.write_all(SUMMARY.as_bytes())?;

    section(out, "Repository Metrics")?;
    write_metrics(out, metrics, top_n)?;

    section(out, "Repository Structure")?;
    for line in tree {
        writeln!(out, "{}", line)?;
    }

    section(out, "Repository Files")?;
    let mut stats = DocumentStats::default();
    for file in files {
        let content = match reader::document_text(&file.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("leaving {} out of the document: {}", file.relative, e);
                stats.files_skipped += 1;
                continue;
            }
        };
        write!(out, "{}\nFile: {}\n{}\n", FILE_RULE, file.relative, FILE_RULE)?;
        out.write_all(content.as_bytes())?;
        out.write_all(b"\n\n")?;
        stats.files_written += 1;
    }

    Ok(stats)
}

pub fn write_document_file(
    path: &Path,
    metrics: &RepoMetrics,
    top_n: usize,
    tree: &[TreeLine],
    files: &[FileEntry],
) -> Result<DocumentStats> {
    let wrap = |source: io::Error| ContextError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    let stats = write_document(&mut out, metrics, top_n, tree, files).map_err(wrap)?;
    out.flush().map_err(wrap)?;

    tracing::info!(
        path = %path.display(),
        written = stats.files_written,
        skipped = stats.files_skipped,
        "document written"
    );
    Ok(stats)
}

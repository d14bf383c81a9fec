use crate::cli::KbArgs;
use crate::settings::{output_name, Settings};
use colored::*;
use repodoc::summarize::{build_knowledge_base, write_knowledge_base, DEFAULT_OUTPUT};
use repodoc::walker::FileEntry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn run(args: KbArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(&args.selection, Some(&args.summarizer))?;
    let output = overview_path(&settings, args.output);
    let ctx = settings.context(&output_name(&output).into_iter().collect::<Vec<_>>())?;
    let outcome = settings.walk(&ctx)?;
    write_overview(&settings, &outcome.files, &output)
}

pub fn overview_path(settings: &Settings, flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| settings.config.summarize.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Summarize `files` on a fresh tokio runtime and write the JSON overview.
pub fn write_overview(
    settings: &Settings,
    files: &[FileEntry],
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let summarizer = Arc::new(settings.summarizer()?);
    let options = settings.config.summarize.options();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let overview = runtime.block_on(build_knowledge_base(files, summarizer, options));
    write_knowledge_base(output, &overview)?;

    println!(
        "{} {} file overviews to {}",
        "Wrote".green().bold(),
        overview.len(),
        output.display()
    );
    Ok(())
}

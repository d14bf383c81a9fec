use crate::cli::PackArgs;
use crate::kb;
use crate::settings::{output_name, Settings};
use colored::*;
use repodoc::config::DEFAULT_OUTPUT;
use repodoc::document::write_document_file;
use repodoc::metrics::aggregate;
use repodoc::render::TreeRenderer;
use repodoc::tokens::TokenCounter;
use std::fs;
use std::path::PathBuf;

pub fn run(args: PackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let summarizer = args.knowledge_base.then_some(&args.summarizer);
    let settings = Settings::load(&args.selection, summarizer)?;
    let top_n = settings.top_n(args.top);
    if args.knowledge_base {
        settings.summarizer()?;
    }

    let output = args
        .output
        .clone()
        .or_else(|| settings.config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let overview = args
        .knowledge_base
        .then(|| kb::overview_path(&settings, None));

    let own_outputs: Vec<String> = std::iter::once(&output)
        .chain(overview.as_ref())
        .filter_map(|p| output_name(p))
        .collect();
    let ctx = settings.context(&own_outputs)?;
    let outcome = settings.walk(&ctx)?;

    let metrics = aggregate(&outcome.files, &outcome.tokens, top_n);
    let tree = TreeRenderer::new(&ctx, &outcome.tokens).render();
    let stats = write_document_file(&output, &metrics, top_n, &tree, &outcome.files)?;

    let document_tokens = settings.tokenizer()?.count(&fs::read_to_string(&output)?);
    tracing::info!(path = %output.display(), tokens = document_tokens, "document token count");

    println!(
        "{} {} files ({} tokens in repository) to {}",
        "Packed".green().bold(),
        stats.files_written,
        metrics.total_tokens,
        output.display()
    );
    if stats.files_skipped > 0 {
        println!(
            "{}",
            format!("Skipped {} unreadable files", stats.files_skipped).yellow()
        );
    }
    println!("Document size: {} tokens", document_tokens);

    if let Some(path) = overview {
        kb::write_overview(&settings, &outcome.files, &path)?;
    }

    Ok(())
}

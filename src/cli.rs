use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(about = "Pack a repository into one annotated document for LLM context", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Debug logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Also append the log to this file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write the combined document")]
    Pack(PackArgs),

    #[command(about = "Show the included files as a tree with token counts")]
    Tree(TreeArgs),

    #[command(about = "Show file and token metrics")]
    Stats(StatsArgs),

    #[command(about = "Summarize every included file into a JSON overview")]
    Kb(KbArgs),

    #[command(about = "Create a default .repodoc.toml")]
    Init(InitArgs),
}

/// Flags shared by every command that walks the tree.
#[derive(Args, Clone, Debug, Default)]
pub struct SelectionArgs {
    #[arg(help = "Project path (default: current directory)")]
    pub path: Option<PathBuf>,

    #[arg(long, help = "Config file instead of <path>/.repodoc.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Ignore file (default: <path>/.gitignore)")]
    pub gitignore: Option<PathBuf>,

    #[arg(long = "skip-dir", value_name = "DIR", help = "Directory to skip (repeatable)")]
    pub skip_dirs: Vec<PathBuf>,

    #[arg(long = "skip-file", value_name = "NAME", help = "File name to skip (repeatable)")]
    pub skip_files: Vec<String>,

    #[arg(long = "ext", value_name = "SUFFIX", help = "Include names ending with SUFFIX (repeatable)")]
    pub extensions: Vec<String>,

    #[arg(long = "name", value_name = "NAME", help = "Include files named exactly NAME (repeatable)")]
    pub names: Vec<String>,

    #[arg(long, value_name = "DIR", help = "Exclude files directly inside DIR, keep its subdirectories")]
    pub shallow_exclude: Option<PathBuf>,

    #[arg(long, help = "Tokenizer: cl100k_base, o200k_base or heuristic")]
    pub encoding: Option<String>,

    #[arg(short = 'j', long, help = "Number of parallel jobs (0 = auto)")]
    pub jobs: Option<usize>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct SummarizerArgs {
    #[arg(long, value_name = "CMD", help = "Summarizer command; the prompt is piped to its stdin")]
    pub summarizer: Option<String>,

    #[arg(long, help = "Maximum concurrent summaries")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Characters of each file sent to the summarizer")]
    pub max_chars: Option<usize>,
}

#[derive(Parser)]
pub struct PackArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(short, long, help = "Output file (default: combined_docs.txt)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Number of largest files to list")]
    pub top: Option<usize>,

    #[arg(long, help = "Also write the knowledge base overview")]
    pub knowledge_base: bool,

    #[command(flatten)]
    pub summarizer: SummarizerArgs,
}

#[derive(Parser)]
pub struct TreeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, help = "Disable colors")]
    pub no_color: bool,

    #[arg(long, help = "Output format: text, json, xml (default: text)")]
    pub format: Option<String>,
}

#[derive(Parser)]
pub struct StatsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, help = "Number of largest files to list")]
    pub top: Option<usize>,

    #[arg(long, help = "Output format: text, json, xml (default: text)")]
    pub format: Option<String>,
}

#[derive(Parser)]
pub struct KbArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(short, long, help = "Output file (default: combined-knowledge-base-overview.json)")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub summarizer: SummarizerArgs,
}

#[derive(Parser)]
pub struct InitArgs {
    #[arg(short, long, help = "Overwrite an existing .repodoc.toml")]
    pub force: bool,
}

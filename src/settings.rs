use crate::cli::{SelectionArgs, SummarizerArgs};
use repodoc::config::{load_config, Config, SummarizeConfig};
use repodoc::context::{FileTypeRule, RootContext};
use repodoc::ignore::IgnorePatterns;
use repodoc::summarize::CommandSummarizer;
use repodoc::tokens::{Encoding, Tokenizer};
use repodoc::walker::{TreeWalker, WalkOutcome};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Config files merged with command-line flags for one run.
pub struct Settings {
    pub root: PathBuf,
    pub config: Config,
}

impl Settings {
    pub fn load(
        selection: &SelectionArgs,
        summarizer: Option<&SummarizerArgs>,
    ) -> Result<Self, Box<dyn Error>> {
        let root = selection.path.clone().unwrap_or_else(|| PathBuf::from("."));
        let config = load_config(&root, selection.config.as_deref())?;
        Self::with_config(root, config, selection, summarizer)
    }

    /// Apply command-line flags on top of an already loaded `config`.
    pub fn with_config(
        root: PathBuf,
        mut config: Config,
        selection: &SelectionArgs,
        summarizer: Option<&SummarizerArgs>,
    ) -> Result<Self, Box<dyn Error>> {
        config.merge(flags_config(selection)?);
        if let Some(args) = summarizer {
            config.summarize.merge(summarize_flags(args));
        }
        Ok(Settings { root, config })
    }

    /// Selection context; `extra_skip_files` keeps the run's own outputs out
    /// of the inclusion set.
    pub fn context(&self, extra_skip_files: &[String]) -> Result<RootContext, Box<dyn Error>> {
        let mut skip_files = self.config.skip_files.clone().unwrap_or_default();
        skip_files.extend(extra_skip_files.iter().cloned());

        let ctx = RootContext::builder(&self.root)
            .skip_dirs(self.config.skip_dirs_or_default())
            .skip_files(skip_files)
            .file_types(self.config.file_types.clone().unwrap_or_default())
            .shallow_exclude(self.config.shallow_exclude.clone())
            .ignore_fn(self.ignore_patterns().into_predicate())
            .build()?;
        tracing::debug!(root = %ctx.root().display(), "selection context ready");
        Ok(ctx)
    }

    fn ignore_patterns(&self) -> IgnorePatterns {
        let path = self.config.gitignore_path(&self.root);
        if self.config.gitignore.is_none() && !path.is_file() {
            tracing::debug!(path = %path.display(), "no ignore file");
            return IgnorePatterns::none();
        }
        IgnorePatterns::load(&path)
    }

    pub fn tokenizer(&self) -> Result<Tokenizer, Box<dyn Error>> {
        let encoding = match &self.config.encoding {
            Some(name) => name.parse::<Encoding>()?,
            None => Encoding::default(),
        };
        Ok(Tokenizer::new(encoding))
    }

    pub fn jobs(&self) -> usize {
        self.config.jobs.unwrap_or(0)
    }

    pub fn top_n(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or_else(|| self.config.top_n_or_default())
    }

    pub fn summarizer(&self) -> Result<CommandSummarizer, Box<dyn Error>> {
        let command = self.config.summarize.command.as_deref().unwrap_or_default();
        match command.split_first() {
            Some((program, args)) => Ok(CommandSummarizer::new(program.clone(), args.to_vec())),
            None => Err("no summarizer configured; pass --summarizer or set [summarize] command".into()),
        }
    }

    /// Walk the tree and price every included file.
    pub fn walk(&self, ctx: &RootContext) -> Result<WalkOutcome, Box<dyn Error>> {
        let tokenizer = self.tokenizer()?;
        let outcome = TreeWalker::new(ctx).with_jobs(self.jobs()).walk(&tokenizer)?;
        tracing::info!(
            files = outcome.files.len(),
            tokens = outcome.tokens.total(),
            "walked {}",
            ctx.root().display()
        );
        Ok(outcome)
    }
}

pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Name component of an output path, for excluding it from the walk.
pub fn output_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

fn flags_config(args: &SelectionArgs) -> Result<Config, Box<dyn Error>> {
    let mut rules: Vec<FileTypeRule> = args.extensions.iter().map(FileTypeRule::suffix).collect();
    rules.extend(args.names.iter().map(FileTypeRule::exact));

    // flag paths are relative to the working directory, config paths to the root
    let gitignore = match &args.gitignore {
        Some(p) => Some(std::env::current_dir()?.join(p)),
        None => None,
    };

    Ok(Config {
        gitignore,
        skip_dirs: non_empty(args.skip_dirs.clone()),
        skip_files: non_empty(args.skip_files.clone()),
        file_types: non_empty(rules),
        shallow_exclude: args.shallow_exclude.clone(),
        encoding: args.encoding.clone(),
        jobs: args.jobs,
        ..Config::default()
    })
}

fn summarize_flags(args: &SummarizerArgs) -> SummarizeConfig {
    SummarizeConfig {
        command: args
            .summarizer
            .as_deref()
            .map(|line| line.split_whitespace().map(String::from).collect())
            .filter(|parts: &Vec<String>| !parts.is_empty()),
        concurrency: args.concurrency,
        max_chars: args.max_chars,
        ..SummarizeConfig::default()
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

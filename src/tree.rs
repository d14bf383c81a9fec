use crate::cli::TreeArgs;
use crate::settings::{project_name, Settings};
use colored::*;
use repodoc::output::{json, xml, OutputFormat, TreeOutput};
use repodoc::render::{LineKind, TreeLine, TreeRenderer};

pub fn run(args: TreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = args.format.as_deref().unwrap_or("text").parse()?;
    let settings = Settings::load(&args.selection, None)?;
    let ctx = settings.context(&[])?;
    let outcome = settings.walk(&ctx)?;
    let lines = TreeRenderer::new(&ctx, &outcome.tokens).render();

    match format {
        OutputFormat::Text => print_tree(&lines, args.no_color),
        OutputFormat::Json | OutputFormat::Xml => {
            let data = TreeOutput {
                project: project_name(ctx.root()),
                entries: &lines,
            };
            let rendered = match format {
                OutputFormat::Json => json::render_tree(&data)?,
                _ => xml::render_tree(&data)?,
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn print_tree(lines: &[TreeLine], no_color: bool) {
    if no_color {
        for line in lines {
            println!("{}", line);
        }
        return;
    }

    for line in lines {
        let label = match line.kind {
            LineKind::Directory => line.label().blue().bold().to_string(),
            LineKind::File { .. } => line.label(),
        };
        let note = match (&line.kind, line.annotation()) {
            (LineKind::File { tokens: Some(_) }, Some(note)) => format!(" {}", note.dimmed()),
            (_, Some(note)) => format!(" {}", note.yellow()),
            (_, None) => String::new(),
        };
        println!("{}{}{}", line.prefix, label, note);
    }
}

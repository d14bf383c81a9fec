use crate::cli::StatsArgs;
use crate::settings::{project_name, Settings};
use repodoc::document::write_metrics;
use repodoc::metrics::aggregate;
use repodoc::output::{json, xml, OutputFormat, StatsOutput};
use std::io::{self, Write};

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let format: OutputFormat = args.format.as_deref().unwrap_or("text").parse()?;
    let settings = Settings::load(&args.selection, None)?;
    let top_n = settings.top_n(args.top);
    let ctx = settings.context(&[])?;
    let outcome = settings.walk(&ctx)?;
    let metrics = aggregate(&outcome.files, &outcome.tokens, top_n);

    let data = StatsOutput {
        project: project_name(ctx.root()),
        metrics: &metrics,
    };
    match format {
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_metrics(&mut out, &metrics, top_n)?;
            out.flush()?;
        }
        OutputFormat::Json => println!("{}", json::render_stats(&data)?),
        OutputFormat::Xml => println!("{}", xml::render_stats(&data)?),
    }

    Ok(())
}

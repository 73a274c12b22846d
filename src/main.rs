use anyhow::Result;
use clap::Parser;
use mctrigger_core::{init_logging, MessageSink, TracingSink};
use mctrigger_io::JsonlSink;
use mctrigger_lib::app::{App, Tee};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trigger settings file
    #[arg(short, long, default_value = "settings.toml")]
    settings: String,

    /// Problem snapshot (tallies, meshes, eigenvalue) as JSON
    #[arg(short = 'p', long, default_value = "problem.json")]
    snapshot: String,

    /// First batch to evaluate
    #[arg(short, long)]
    batch: u32,

    /// Last batch to evaluate (defaults to --batch)
    #[arg(short, long)]
    through: Option<u32>,

    /// Append status messages to this JSON-lines file
    #[arg(short, long)]
    log: Option<String>,

    /// Print every trigger observation as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(tracing::Level::INFO);

    let mut app = App::load(&args.settings, &args.snapshot)?;
    let last = args.through.unwrap_or(args.batch).max(args.batch);

    let summary = match &args.log {
        Some(path) => {
            let mut sink = Tee(TracingSink, JsonlSink::append(path)?);
            let summary = run(&mut app, args.batch, last, &mut sink);
            let lost = sink.1.finish()?;
            if lost > 0 {
                eprintln!("Warning: {lost} status messages could not be written to {path}.");
            }
            summary
        }
        None => run(&mut app, args.batch, last, &mut TracingSink),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&app.verdicts)?);
    }

    match summary.converged_at {
        Some(batch) => println!("Converged at batch {batch}."),
        None if summary.evaluated.is_empty() => {
            println!("No trigger check due in batches {}..={last}.", args.batch)
        }
        None => println!(
            "Not converged after checking batches {:?}.",
            summary.evaluated
        ),
    }
    Ok(())
}

fn run<S: MessageSink>(
    app: &mut App,
    first: u32,
    last: u32,
    sink: &mut S,
) -> mctrigger_lib::app::RunSummary {
    app.run(first..=last, sink)
}

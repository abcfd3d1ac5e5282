use clap::Parser;
use colored::*;
use modscope_core::{Observer, UnitBuilder};

/// modscope - observe how module-unit export bindings behave under mutation
#[derive(Parser)]
#[command(name = "modscope", author, version, about, long_about = None)]
struct Cli {
    /// Print verbose logs
    #[arg(short, long)]
    verbose: bool,

    /// Emit records through the tracing pipeline instead of plain stdout
    #[arg(long)]
    trace: bool,
}

/// Trace-mode records go through `tracing::info!`, so that mode needs at
/// least INFO even when verbose logging is off.
fn log_level(verbose: bool, trace: bool) -> tracing::Level {
    if verbose {
        tracing::Level::DEBUG
    } else if trace {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(log_level(cli.verbose, cli.trace))
        .without_time()
        .init();

    let registry = UnitBuilder::default().build();
    let records = Observer::default()
        .observe(&registry)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    for record in &records {
        if cli.trace {
            tracing::info!(label = %record.label, "{}", record.value);
        } else {
            println!("{} {}", record.label.cyan().bold(), record.value);
        }
    }

    Ok(())
}

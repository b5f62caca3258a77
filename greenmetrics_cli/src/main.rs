mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "greenmetrics")]
#[command(about = "Collect and report green-innovation indicator values")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Directory holding the catalog CSV files and the results file
    /// (defaults to $GREENMETRICS_DATA_DIR, then ./data)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List innovations, optionally filtered by tag
    Innovations(commands::innovations::InnovationsArgs),
    /// Show the full description of one innovation
    Describe(commands::describe::DescribeArgs),
    /// Show the indicator mapping and inferred domains for one innovation
    Indicators(commands::indicators::IndicatorsArgs),
    /// Validate a file of measured values and commit them to the results store
    Submit(commands::submit::SubmitArgs),
    /// Aggregated results: per-record table plus per-category summaries
    Report(commands::report::ReportArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("greenmetrics_lib=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };
    let paths = config::resolve(cli.data_dir.as_deref());

    match &cli.command {
        Commands::Innovations(args) => commands::innovations::run(args, &paths, &format)?,
        Commands::Describe(args) => commands::describe::run(args, &paths, &format)?,
        Commands::Indicators(args) => commands::indicators::run(args, &paths, &format)?,
        Commands::Submit(args) => commands::submit::run(args, &paths, &format)?,
        Commands::Report(args) => commands::report::run(args, &paths, &format)?,
    }

    Ok(())
}

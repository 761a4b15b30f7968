mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::model::{EvaluateArgs, RunModelArgs, SummarizeArgs};
use commands::pipeline::AllArgs;
use commands::sensitivity::SensitivityArgs;
use commands::RunContext;
use config::Settings;

/// Levered project finance pro forma for solar and wind assets
#[derive(Parser)]
#[command(
    name = "proforma",
    version,
    about = "Levered project finance pro forma for renewable generation assets",
    long_about = "Runs an annual levered cash-flow model (production, revenue, tax, \
                  debt service) for stored solar/wind projects, reports IRR, NPV, \
                  payback and minimum DSCR, and sweeps PPA price, capex and leverage."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Settings file (YAML). Defaults to config/settings.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project store: JSON file path or sqlite:/// URL. Overrides PROFORMA_DB
    /// and the settings file.
    #[arg(long, global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed the project store with sample projects
    InitDb,
    /// Run the pro forma for a stored project and persist the result
    RunModel(RunModelArgs),
    /// Write a Markdown summary of the latest stored result
    Summarize(SummarizeArgs),
    /// Run the PPA x capex x leverage sensitivity sweep and export CSV
    Sensitivity(SensitivityArgs),
    /// Run model, summary and sensitivity for a project
    All(AllArgs),
    /// Evaluate an ad-hoc scenario from a JSON file or stdin
    Evaluate(EvaluateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("proforma {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let loaded = Settings::load(cli.config.as_deref()).and_then(|s| RunContext::new(s, cli.db));
    let ctx = match loaded {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::InitDb => commands::db::run_init_db(&ctx),
        Commands::RunModel(args) => commands::model::run_model(args, &ctx),
        Commands::Summarize(args) => commands::model::run_summarize(args, &ctx),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args, &ctx),
        Commands::All(args) => commands::pipeline::run_all(args, &ctx),
        Commands::Evaluate(args) => commands::model::run_evaluate(args, &ctx),
        Commands::Version => unreachable!("handled above"),
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

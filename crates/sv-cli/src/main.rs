use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod schema_load;

use config::CheckConfig;

#[derive(Parser)]
#[command(name = "scriptvet", about = "Schema-driven script and translation file validator")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate script and translation files
    Check {
        /// Files to validate
        paths: Vec<PathBuf>,

        /// Path to scriptvet.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the schema documents; overrides the config file
        #[arg(long)]
        schema_dir: Option<PathBuf>,

        /// Lowest severity to report (error, warning, hint, info);
        /// overrides the config file
        #[arg(long)]
        min_severity: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            paths,
            config,
            schema_dir,
            min_severity,
        } => {
            let config = CheckConfig::load(config.as_deref(), schema_dir, min_severity.as_deref())?;
            let snapshot = schema_load::load_schema_dir(&config.schema_dir)?;
            let registry = sv_lang::SchemaRegistry::new(snapshot);

            let snapshot = registry.snapshot();
            let mut errors = 0usize;
            for path in &paths {
                errors += report::check_file(path, &snapshot, config.min_severity)?;
            }

            if errors > 0 {
                tracing::info!(errors, "validation finished with errors");
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

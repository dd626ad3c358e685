//! pgdelta CLI - compare two PostgreSQL databases and report drift
//!
//! This is the main entry point for the pgdelta command-line tool, which
//! provides:
//! - Source/target comparison with exit code 1 on any difference
//!   (`compare` subcommand)
//! - Catalog introspection output (`schemas` subcommand)
//! - Fixed-width distinct-count column profiling (`histogram` subcommand)
//! - Config template, inspection, and validation (`config` subcommand)

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "pgdelta",
    author,
    version,
    about = "Compare two PostgreSQL databases and report where they drift apart",
    long_about = "Compare a source and a target PostgreSQL database: missing tables, \
                  mismatched columns or keys, diverging record counts, and row-level \
                  data differences. Exits non-zero when the databases are not in sync."
)]
struct Cli {
    /// Suppress progress spinners and bars (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare source and target databases (exit 1 when they differ)
    Compare(commands::compare::CompareArgs),
    /// Introspect one side and print its tables, keys, and columns
    Schemas(commands::schemas::SchemasArgs),
    /// Profile a numeric column into fixed-width bins, counting distinct keys per bin
    Histogram(commands::histogram::HistogramArgs),
    /// Manage pgdelta configuration (init, show, check)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Load .env from the current directory, then ~/.pgdelta/.env. Already
/// set variables are never overwritten.
fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("loaded .env from {}", path.display());
    }
    if let Some(home) = dirs::home_dir() {
        let env_file = home.join(".pgdelta").join(".env");
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            debug!("loaded .env from {}", env_file.display());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().ok();
    load_dotenv();
    let cli = Cli::parse();

    // Initialize UI quiet mode from flag, env var, and TTY detection
    ui::init_quiet_mode(cli.quiet);

    match cli.command {
        Commands::Compare(args) => {
            let in_sync = commands::compare::run_compare(args).await?;
            if !in_sync {
                std::process::exit(1);
            }
        }
        Commands::Schemas(args) => commands::schemas::run_schemas(args).await?,
        Commands::Histogram(args) => commands::histogram::run_histogram(args).await?,
        Commands::Config(args) => commands::config::run_config(args)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

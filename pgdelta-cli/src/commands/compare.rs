//! `pgdelta compare` - the schema/data comparison command.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args};
use tracing::info;

use pgdelta_core::Config;
use pgdelta_diff::{compare, CompareOptions, DatabaseProxy};

use crate::ui;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Config file with source and target sections
    #[arg(long, short = 'c', default_value = "config.yml", value_name = "PATH")]
    config: String,

    /// Environment variable prefix for config overrides
    #[arg(long = "env-prefix", value_name = "PREFIX")]
    env_prefix: Option<String>,

    /// Schemas to compare (repeatable; default: all)
    #[arg(long = "schema", short = 's', value_name = "NAME")]
    schema: Vec<String>,

    /// Log every per-object decision
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Stop at the first difference (default)
    #[arg(long = "break-on-diff", overrides_with = "no_break_on_diff", action = ArgAction::SetTrue)]
    break_on_diff: bool,

    /// Keep going after the first difference
    #[arg(long = "no-break-on-diff", action = ArgAction::SetTrue)]
    no_break_on_diff: bool,

    /// Disable the real-time progress bar output
    #[arg(long = "no-progress", action = ArgAction::SetTrue)]
    no_progress: bool,

    /// Append row deltas to this file when data differs
    #[arg(long = "output-file", short = 'o', value_name = "PATH")]
    output_file: Option<PathBuf>,
}

/// Returns true when the databases are in sync. The caller maps false
/// onto exit code 1, which is the command's contract.
pub async fn run_compare(args: CompareArgs) -> Result<bool> {
    let config = Config::load_with_env(&args.config, args.env_prefix.as_deref())?;
    let source = DatabaseProxy::connect(config.connection("source")?).await?;
    let target = DatabaseProxy::connect(config.connection("target")?).await?;

    info!("comparing {} against {}", source.label(), target.label());

    let opts = CompareOptions {
        schemas: args.schema,
        break_on_diff: args.break_on_diff || !args.no_break_on_diff,
        verbose: args.verbose,
        output_file: args.output_file,
    };

    let pb = if args.no_progress {
        None
    } else {
        ui::table_walk_bar("comparing")
    };

    let report = compare(&source, &target, &opts, pb.as_ref()).await?;

    if report.in_sync() {
        ui::finish(
            pb,
            format!("in sync ({} tables checked)", report.tables_checked),
        );
        Ok(true)
    } else {
        ui::finish(pb, format!("{} difference(s) found", report.findings.len()));
        for finding in &report.findings {
            println!("{finding}");
        }
        Ok(false)
    }
}

//! `pgdelta histogram` - fixed-width distinct-count column profiling.

use anyhow::Result;
use clap::Args;

use pgdelta_core::{BinSpec, Config};
use pgdelta_diff::HistogramRequest;

use super::{connect_side, Side};
use crate::ui;

#[derive(Args, Debug)]
pub struct HistogramArgs {
    /// Config file with source and target sections
    #[arg(long, short = 'c', default_value = "config.yml", value_name = "PATH")]
    config: String,

    /// Environment variable prefix for config overrides
    #[arg(long = "env-prefix", value_name = "PREFIX")]
    env_prefix: Option<String>,

    /// Which side to run against
    #[arg(long, value_enum, default_value_t = Side::Source)]
    side: Side,

    /// Table to profile (table or schema.table)
    #[arg(long, value_name = "TABLE")]
    table: String,

    /// Numeric column binned into categories
    #[arg(long = "value-column", value_name = "COLUMN")]
    value_column: String,

    /// Key column counted distinctly per category
    #[arg(long = "key-column", value_name = "COLUMN")]
    key_column: String,

    /// Outer lower bound
    #[arg(long)]
    lower: f64,

    /// Outer upper bound (inclusive, lands in the last category)
    #[arg(long)]
    upper: f64,

    /// Category width
    #[arg(long)]
    width: f64,

    /// Print the SQL instead of executing it
    #[arg(long = "emit-sql")]
    emit_sql: bool,
}

pub async fn run_histogram(args: HistogramArgs) -> Result<()> {
    let spec = BinSpec::new(args.lower, args.upper, args.width)?;
    let request = HistogramRequest {
        table: args.table,
        value_column: args.value_column,
        key_column: args.key_column,
        spec,
    };

    if args.emit_sql {
        println!("{}", request.sql()?);
        return Ok(());
    }

    let config = Config::load_with_env(&args.config, args.env_prefix.as_deref())?;
    let proxy = connect_side(&config, args.side).await?;

    let pb = ui::spinner(format!("profiling {}", request.table));
    let rows = pgdelta_diff::histogram::run_histogram(&proxy, &request).await?;
    ui::finish(pb, format!("{} categories", rows.len()));

    for row in rows {
        println!("{:>16}  {}", row.category.to_string(), row.distinct_keys);
    }
    Ok(())
}

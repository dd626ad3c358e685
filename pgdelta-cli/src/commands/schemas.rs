//! `pgdelta schemas` - print one side's introspected catalog.

use anyhow::Result;
use clap::Args;

use pgdelta_core::Config;
use pgdelta_diff::TableInfo;

use super::{connect_side, Side};
use crate::ui;

#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Config file with source and target sections
    #[arg(long, short = 'c', default_value = "config.yml", value_name = "PATH")]
    config: String,

    /// Environment variable prefix for config overrides
    #[arg(long = "env-prefix", value_name = "PREFIX")]
    env_prefix: Option<String>,

    /// Which side to introspect
    #[arg(long, value_enum, default_value_t = Side::Source)]
    side: Side,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

pub async fn run_schemas(args: SchemasArgs) -> Result<()> {
    let config = Config::load_with_env(&args.config, args.env_prefix.as_deref())?;
    let proxy = connect_side(&config, args.side).await?;

    let pb = ui::spinner(format!("introspecting {}", proxy.label()));
    let schemas = proxy.schemas().await?;
    ui::finish(pb, format!("{} schema(s)", schemas.len()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    for (schema_name, tables) in &schemas {
        println!("{schema_name}");
        for info in tables.values() {
            println!("  {}", describe_table(info));
        }
    }
    Ok(())
}

/// One line per table: name, key columns in brackets, then the value
/// columns.
fn describe_table(info: &TableInfo) -> String {
    let keys = info
        .primary_keys
        .as_ref()
        .map(|keys| keys.join(", "))
        .unwrap_or_else(|| "<no primary key>".to_string());
    format!("{} [{}] {}", info.table_name, keys, info.columns.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_table_lists_keys_and_columns() {
        let info = TableInfo {
            schema_name: "geochron".to_string(),
            table_name: "ages".to_string(),
            primary_keys: Some(vec!["analysis_id".to_string()]),
            columns: vec!["age".to_string(), "method".to_string()],
        };
        assert_eq!(describe_table(&info), "ages [analysis_id] age, method");

        let keyless = TableInfo {
            primary_keys: None,
            ..info
        };
        assert_eq!(
            describe_table(&keyless),
            "ages [<no primary key>] age, method"
        );
    }
}

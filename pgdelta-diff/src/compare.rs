//! The comparison engine: walk the source catalog, check each table
//! against the target, and collect findings.
//!
//! Checks run cheapest-first per table: shape, then record count, then
//! row checksums. Tables without a primary key are skipped (there is no
//! stable row identity to join on).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::proxy::{DatabaseProxy, Schemas};
use crate::rowdiff;
use crate::table::TableInfo;

/// Options for one comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Only compare these schemas; empty means all.
    pub schemas: Vec<String>,
    /// Stop at the first finding.
    pub break_on_diff: bool,
    /// Log per-object progress and skips.
    pub verbose: bool,
    /// Append row deltas here when data differs.
    pub output_file: Option<PathBuf>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            break_on_diff: true,
            verbose: false,
            output_file: None,
        }
    }
}

/// One observed difference between source and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    SchemaMissingInTarget {
        schema: String,
    },
    ExtraTargetTables {
        schema: String,
        tables: Vec<String>,
    },
    TableShapeDiffers {
        table: String,
    },
    RecordCountDiffers {
        table: String,
        source: i64,
        target: i64,
    },
    DataDiffers {
        table: String,
        rows: usize,
    },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::SchemaMissingInTarget { schema } => {
                write!(f, "{schema}: missing in target")
            }
            Finding::ExtraTargetTables { schema, tables } => {
                write!(
                    f,
                    "{schema}: target has tables the source lacks: {}",
                    tables.join(", ")
                )
            }
            Finding::TableShapeDiffers { table } => {
                write!(f, "{table}: columns or keys differ")
            }
            Finding::RecordCountDiffers {
                table,
                source,
                target,
            } => {
                write!(
                    f,
                    "{table}: record count differs (source {source}, target {target})"
                )
            }
            Finding::DataDiffers { table, rows } => {
                write!(f, "{table}: data differs ({rows} rows)")
            }
        }
    }
}

/// Outcome of a comparison run.
#[derive(Debug, Default)]
pub struct CompareReport {
    pub findings: Vec<Finding>,
    pub tables_checked: usize,
}

impl CompareReport {
    /// True when no differences were found.
    pub fn in_sync(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Compare the source database against the target.
///
/// The progress bar, when given, gets its length set to the number of
/// tables in scope and one tick per table.
pub async fn compare(
    source: &DatabaseProxy,
    target: &DatabaseProxy,
    opts: &CompareOptions,
    progress: Option<&ProgressBar>,
) -> Result<CompareReport> {
    let source_schemas = source.schemas().await?;
    let target_schemas = target.schemas().await?;

    if let Some(pb) = progress {
        pb.set_length(tables_in_scope(&source_schemas, &opts.schemas));
    }

    let mut report = CompareReport::default();

    'schemas: for (schema_name, tables) in &source_schemas {
        if !opts.schemas.is_empty() && !opts.schemas.contains(schema_name) {
            if opts.verbose {
                info!("{} not in schemas (skipping)", schema_name);
            }
            continue;
        }

        let Some(target_tables) = target_schemas.get(schema_name) else {
            if opts.verbose {
                warn!("{} missing in target", schema_name);
            }
            report.findings.push(Finding::SchemaMissingInTarget {
                schema: schema_name.clone(),
            });
            if opts.break_on_diff {
                break;
            }
            continue;
        };

        let extra = extra_tables(tables, target_tables);
        if !extra.is_empty() {
            if opts.verbose {
                warn!("{} target has more tables than source", schema_name);
            }
            report.findings.push(Finding::ExtraTargetTables {
                schema: schema_name.clone(),
                tables: extra,
            });
            if opts.break_on_diff {
                break;
            }
        }

        for (table_name, source_table) in tables {
            let qualified = source_table.qualified_name();
            if let Some(pb) = progress {
                pb.set_message(qualified.clone());
                pb.inc(1);
            }

            if source_table.primary_keys.is_none() {
                if opts.verbose {
                    info!("{} has no primary key (skipped)", qualified);
                }
                continue;
            }

            if Some(source_table) != target_tables.get(table_name) {
                if opts.verbose {
                    warn!("{} columns or keys differ", qualified);
                }
                report.findings.push(Finding::TableShapeDiffers {
                    table: qualified,
                });
                if opts.break_on_diff {
                    break 'schemas;
                }
                continue;
            }

            report.tables_checked += 1;

            let source_count = source.record_count(source_table).await?;
            let target_count = target.record_count(source_table).await?;
            if source_count != target_count {
                if opts.verbose {
                    warn!("{} record count differs", qualified);
                }
                report.findings.push(Finding::RecordCountDiffers {
                    table: qualified,
                    source: source_count,
                    target: target_count,
                });
                if opts.break_on_diff {
                    break 'schemas;
                }
                continue;
            }

            if source_count == 0 {
                if opts.verbose {
                    info!("{} is empty", qualified);
                }
                continue;
            }

            // An operational failure here (dropped connection, permission
            // error) must not pass for "in sync"; it aborts the run.
            let deltas = diff_table(source, target, source_table)
                .await
                .with_context(|| format!("row diff failed for {qualified}"))?;

            if deltas.is_empty() {
                if opts.verbose {
                    info!("{} data is the same", qualified);
                }
                continue;
            }

            if opts.verbose {
                info!("{} data differs", qualified);
            }
            if let Some(path) = &opts.output_file {
                append_deltas(path, &qualified, &deltas)?;
            }
            report.findings.push(Finding::DataDiffers {
                table: qualified,
                rows: deltas.len(),
            });
            if opts.break_on_diff {
                break 'schemas;
            }
        }
    }

    Ok(report)
}

async fn diff_table(
    source: &DatabaseProxy,
    target: &DatabaseProxy,
    table: &TableInfo,
) -> Result<Vec<rowdiff::RowDelta>> {
    let source_rows = rowdiff::fetch_checksums(source.pool(), table).await?;
    let target_rows = rowdiff::fetch_checksums(target.pool(), table).await?;
    Ok(rowdiff::diff_ordered(&source_rows, &target_rows))
}

fn append_deltas(path: &PathBuf, table: &str, deltas: &[rowdiff::RowDelta]) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open output file {}", path.display()))?;
    file.write_all(rowdiff::format_deltas(table, deltas).as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}

/// Tables present in target but not in source, ordered.
fn extra_tables(
    source_tables: &std::collections::BTreeMap<String, TableInfo>,
    target_tables: &std::collections::BTreeMap<String, TableInfo>,
) -> Vec<String> {
    target_tables
        .keys()
        .filter(|name| !source_tables.contains_key(*name))
        .cloned()
        .collect()
}

fn tables_in_scope(schemas: &Schemas, filter: &[String]) -> u64 {
    schemas
        .iter()
        .filter(|(name, _)| filter.is_empty() || filter.contains(name))
        .map(|(_, tables)| tables.len() as u64)
        .sum()
}

//! Executes the fixed-width binning diagnostic against one database:
//! distinct key values per category of a numeric column.

use anyhow::{bail, Context, Result};
use pgdelta_core::{BinSpec, Category};

use crate::proxy::DatabaseProxy;
use crate::table::quote_ident;

/// What to profile: a table, the numeric column to bin, and the key
/// column to count distinct values of.
#[derive(Debug, Clone)]
pub struct HistogramRequest {
    /// `table` or `schema.table`.
    pub table: String,
    pub value_column: String,
    pub key_column: String,
    pub spec: BinSpec,
}

/// One bin of the result, in bin order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    pub category: Category,
    pub distinct_keys: i64,
}

impl HistogramRequest {
    /// The query this request will run, identifiers quoted.
    pub fn sql(&self) -> Result<String> {
        Ok(self.spec.to_sql(
            &quoted_table_path(&self.table)?,
            &quote_ident(&self.value_column),
            &quote_ident(&self.key_column),
        ))
    }
}

/// Run the histogram query. Bins with no matching rows are absent from
/// the SQL result and come back with a zero count here.
pub async fn run_histogram(
    proxy: &DatabaseProxy,
    request: &HistogramRequest,
) -> Result<Vec<HistogramRow>> {
    let sql = request.sql()?;
    let rows: Vec<(f64, f64, i64)> = sqlx::query_as(&sql)
        .fetch_all(proxy.pool())
        .await
        .with_context(|| format!("histogram query failed for {}", request.table))?;

    let result = request
        .spec
        .categories()
        .into_iter()
        .map(|category| {
            let distinct_keys = rows
                .iter()
                .find(|(lower, _, _)| *lower == category.lower)
                .map(|(_, _, count)| *count)
                .unwrap_or(0);
            HistogramRow {
                category,
                distinct_keys,
            }
        })
        .collect();
    Ok(result)
}

/// Quote a `table` or `schema.table` reference. Defaults to the public
/// schema when unqualified.
fn quoted_table_path(table: &str) -> Result<String> {
    let parts: Vec<&str> = table.split('.').collect();
    match parts.as_slice() {
        [table_name] => Ok(format!("{}.{}", quote_ident("public"), quote_ident(table_name))),
        [schema, table_name] => Ok(format!(
            "{}.{}",
            quote_ident(schema),
            quote_ident(table_name)
        )),
        _ => bail!("invalid table reference '{table}', expected table or schema.table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_table_path() {
        assert_eq!(
            quoted_table_path("ages").unwrap(),
            "\"public\".\"ages\""
        );
        assert_eq!(
            quoted_table_path("geochron.ages").unwrap(),
            "\"geochron\".\"ages\""
        );
        assert!(quoted_table_path("a.b.c").is_err());
    }

    #[test]
    fn test_request_sql_quotes_identifiers() {
        let request = HistogramRequest {
            table: "geochron.ages".to_string(),
            value_column: "age".to_string(),
            key_column: "analysis_id".to_string(),
            spec: BinSpec::new(0.0, 100.0, 25.0).expect("valid spec"),
        };
        let sql = request.sql().expect("renders");
        assert!(sql.contains("\"geochron\".\"ages\""));
        assert!(sql.contains("t.\"age\""));
        assert!(sql.contains("count(distinct t.\"analysis_id\")"));
    }
}

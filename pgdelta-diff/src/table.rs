//! Table metadata as read from the catalog.

use serde::Serialize;

/// The column name treated as the update timestamp when present.
const TIMESTAMP_COLUMN: &str = "date_updated";

/// Shape of one table: primary-key columns plus the remaining columns.
///
/// Two tables are considered shape-equal when schema, name, keys and
/// columns all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub schema_name: String,
    pub table_name: String,
    /// None for tables without a primary key; those are skipped by the
    /// comparison engine.
    pub primary_keys: Option<Vec<String>>,
    /// Non-key columns, in ordinal order.
    pub columns: Vec<String>,
}

impl TableInfo {
    /// `schema.table`, for logs and findings.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }

    /// Quoted `"schema"."table"` path for splicing into SQL.
    pub fn quoted_path(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema_name),
            quote_ident(&self.table_name)
        )
    }

    /// The update column, when the table carries one.
    pub fn timestamp(&self) -> Option<&str> {
        self.columns
            .iter()
            .any(|c| c == TIMESTAMP_COLUMN)
            .then_some(TIMESTAMP_COLUMN)
    }

    /// Columns to compare value-by-value: everything but the timestamp.
    pub fn value_columns(&self) -> Vec<&str> {
        match self.timestamp() {
            None => self.columns.iter().map(String::as_str).collect(),
            Some(ts) => self
                .columns
                .iter()
                .map(String::as_str)
                .filter(|c| *c != ts)
                .collect(),
        }
    }
}

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

//! Row-level comparison.
//!
//! Both sides are read as `(primary key values, row checksum)` ordered
//! by the key columns, then merge-joined. The checksum is an md5 of the
//! row's record text computed server-side, so only keys and one hash per
//! row cross the wire. Ordering uses `collate "C"` so the database sort
//! matches Rust's byte-wise comparison during the join.

use std::cmp::Ordering;

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

use crate::table::{quote_ident, TableInfo};

/// One divergent row, identified by its primary key values (as text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDelta {
    /// Present in source, absent in target.
    SourceOnly(Vec<String>),
    /// Present in target, absent in source.
    TargetOnly(Vec<String>),
    /// Present in both with different content.
    Changed(Vec<String>),
}

/// Primary key values plus the row checksum.
pub type KeyedChecksum = (Vec<String>, String);

/// The ordered key+checksum query for a table. None when the table has
/// no primary key.
pub fn checksum_query(table: &TableInfo) -> Option<String> {
    let keys = table.primary_keys.as_ref()?;
    let key_exprs: Vec<String> = keys
        .iter()
        .map(|key| format!("{}::text", quote_ident(key)))
        .collect();
    let order_exprs: Vec<String> = key_exprs
        .iter()
        .map(|expr| format!("{expr} collate \"C\""))
        .collect();

    Some(format!(
        "select {keys}, md5(t::text) as row_hash from {table} as t order by {order}",
        keys = key_exprs.join(", "),
        table = table.quoted_path(),
        order = order_exprs.join(", "),
    ))
}

/// Fetch the ordered key+checksum rows for one side.
pub async fn fetch_checksums(pool: &PgPool, table: &TableInfo) -> Result<Vec<KeyedChecksum>> {
    let sql = checksum_query(table)
        .with_context(|| format!("{} has no primary key", table.qualified_name()))?;
    let key_count = table.primary_keys.as_ref().map(Vec::len).unwrap_or(0);

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("checksum query failed for {}", table.qualified_name()))?;

    rows.into_iter()
        .map(|row| {
            let mut key = Vec::with_capacity(key_count);
            for index in 0..key_count {
                key.push(row.try_get::<String, _>(index)?);
            }
            let hash: String = row.try_get(key_count)?;
            Ok((key, hash))
        })
        .collect()
}

/// Merge-join two key-ordered checksum lists into row deltas.
pub fn diff_ordered(source: &[KeyedChecksum], target: &[KeyedChecksum]) -> Vec<RowDelta> {
    let mut deltas = Vec::new();
    let mut s = 0;
    let mut t = 0;

    while s < source.len() && t < target.len() {
        let (s_key, s_hash) = &source[s];
        let (t_key, t_hash) = &target[t];
        match s_key.cmp(t_key) {
            Ordering::Less => {
                deltas.push(RowDelta::SourceOnly(s_key.clone()));
                s += 1;
            }
            Ordering::Greater => {
                deltas.push(RowDelta::TargetOnly(t_key.clone()));
                t += 1;
            }
            Ordering::Equal => {
                if s_hash != t_hash {
                    deltas.push(RowDelta::Changed(s_key.clone()));
                }
                s += 1;
                t += 1;
            }
        }
    }
    for (key, _) in &source[s..] {
        deltas.push(RowDelta::SourceOnly(key.clone()));
    }
    for (key, _) in &target[t..] {
        deltas.push(RowDelta::TargetOnly(key.clone()));
    }
    deltas
}

/// Textual form of the deltas, one row per line:
/// `-` source-only, `+` target-only, `!` changed.
pub fn format_deltas(table: &str, deltas: &[RowDelta]) -> String {
    let mut out = format!("# {table}\n");
    for delta in deltas {
        let (marker, key) = match delta {
            RowDelta::SourceOnly(key) => ('-', key),
            RowDelta::TargetOnly(key) => ('+', key),
            RowDelta::Changed(key) => ('!', key),
        };
        out.push(marker);
        out.push_str(" (");
        out.push_str(&key.join(", "));
        out.push_str(")\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &[&str], hash: &str) -> KeyedChecksum {
        (key.iter().map(|k| k.to_string()).collect(), hash.to_string())
    }

    #[test]
    fn test_identical_sides_yield_no_deltas() {
        let rows = vec![row(&["1"], "aa"), row(&["2"], "bb")];
        assert!(diff_ordered(&rows, &rows).is_empty());
    }

    #[test]
    fn test_source_only_and_target_only() {
        let source = vec![row(&["1"], "aa"), row(&["2"], "bb")];
        let target = vec![row(&["2"], "bb"), row(&["3"], "cc")];
        assert_eq!(
            diff_ordered(&source, &target),
            vec![
                RowDelta::SourceOnly(vec!["1".to_string()]),
                RowDelta::TargetOnly(vec!["3".to_string()]),
            ]
        );
    }

    #[test]
    fn test_changed_rows_detected_by_hash() {
        let source = vec![row(&["1", "x"], "aa")];
        let target = vec![row(&["1", "x"], "zz")];
        assert_eq!(
            diff_ordered(&source, &target),
            vec![RowDelta::Changed(vec!["1".to_string(), "x".to_string()])]
        );
    }

    #[test]
    fn test_tail_rows_flushed() {
        let source = vec![row(&["1"], "aa"), row(&["2"], "bb"), row(&["3"], "cc")];
        let target = vec![row(&["1"], "aa")];
        assert_eq!(diff_ordered(&source, &target).len(), 2);
        assert!(diff_ordered(&target, &source)
            .iter()
            .all(|d| matches!(d, RowDelta::TargetOnly(_))));
    }

    #[test]
    fn test_checksum_query_shape() {
        let table = TableInfo {
            schema_name: "public".to_string(),
            table_name: "ages".to_string(),
            primary_keys: Some(vec!["analysis_id".to_string(), "dataset_id".to_string()]),
            columns: vec!["age".to_string()],
        };
        let sql = checksum_query(&table).expect("keyed table");
        assert!(sql.contains("\"analysis_id\"::text, \"dataset_id\"::text"));
        assert!(sql.contains("md5(t::text)"));
        assert!(sql.contains("from \"public\".\"ages\" as t"));
        assert!(sql.contains("collate \"C\""));

        let keyless = TableInfo {
            primary_keys: None,
            ..table
        };
        assert!(checksum_query(&keyless).is_none());
    }

    #[tokio::test]
    async fn test_fetch_checksums_requires_primary_key() {
        // connect_lazy never touches the network; the keyless table is
        // rejected before any query runs.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://u:p@localhost/none")
            .expect("lazy pool");
        let keyless = TableInfo {
            schema_name: "public".to_string(),
            table_name: "ages".to_string(),
            primary_keys: None,
            columns: vec!["age".to_string()],
        };

        let err = fetch_checksums(&pool, &keyless).await.unwrap_err();
        assert!(err.to_string().contains("no primary key"));
    }

    #[test]
    fn test_format_deltas() {
        let deltas = vec![
            RowDelta::SourceOnly(vec!["1".to_string()]),
            RowDelta::TargetOnly(vec!["2".to_string(), "b".to_string()]),
            RowDelta::Changed(vec!["3".to_string()]),
        ];
        let text = format_deltas("public.ages", &deltas);
        assert_eq!(text, "# public.ages\n- (1)\n+ (2, b)\n! (3)\n");
    }
}

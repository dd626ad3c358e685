//! Database connection and catalog introspection.
//!
//! Uses sqlx PgPool with explicit connection limits, kept low for
//! single-user tooling.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use pgdelta_core::ConnectionOptions;

use crate::table::TableInfo;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// `schema -> table -> TableInfo`, ordered on both levels.
pub type Schemas = BTreeMap<String, BTreeMap<String, TableInfo>>;

/// One row per user table: comma-separated key columns (null when the
/// table has no primary key) and comma-separated non-key columns, both
/// in ordinal order. System schemas and the sqitch migration schema are
/// excluded.
const CATALOG_COLUMNS_QUERY: &str = r#"
with columns as (
    select t.schemaname::text as schema_name,
        t.tablename::text as table_name,
        a.attname::text as column_name,
        a.attnum as ordinal_position,
        case when pk.contype is null then 'NO' else 'YES' end as is_pk
    from pg_tables t
    join pg_class c
      on c.relname = t.tablename
    join pg_namespace ns
      on ns.oid = c.relnamespace
     and ns.nspname = t.schemaname
    join pg_attribute a
      on c.oid = a.attrelid
     and a.attnum > 0
    left join pg_constraint pk
      on pk.contype = 'p'
     and pk.conrelid = c.oid
     and (a.attnum = any (pk.conkey))
    where a.atttypid <> 0::oid
)
select schema_name, table_name,
    string_agg(column_name, ',' order by ordinal_position) filter (where is_pk = 'YES') as primary_keys,
    string_agg(column_name, ',' order by ordinal_position) filter (where is_pk = 'NO') as column_names
from columns
where schema_name not in ('pg_catalog', 'information_schema', 'sqitch')
group by schema_name, table_name
order by schema_name, table_name
"#;

/// A connected database plus the options it was opened with.
pub struct DatabaseProxy {
    pool: PgPool,
    options: ConnectionOptions,
}

impl DatabaseProxy {
    /// Open a pool against the configured database.
    pub async fn connect(options: ConnectionOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(&options.url())
            .await
            .with_context(|| {
                format!(
                    "failed to connect to {}/{}",
                    options.server, options.database
                )
            })?;
        debug!("connected to {}/{}", options.server, options.database);
        Ok(Self { pool, options })
    }

    /// Open a pool without connecting; the first query establishes the
    /// connection.
    pub fn connect_lazy(options: ConnectionOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect_lazy(&options.url())
            .with_context(|| {
                format!(
                    "invalid connection url for {}/{}",
                    options.server, options.database
                )
            })?;
        Ok(Self { pool, options })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `server/database`, for logs. Never includes credentials.
    pub fn label(&self) -> String {
        format!("{}/{}", self.options.server, self.options.database)
    }

    /// Introspect all user tables with their key and value columns.
    pub async fn schemas(&self) -> Result<Schemas> {
        let rows: Vec<(String, String, Option<String>, Option<String>)> =
            sqlx::query_as(CATALOG_COLUMNS_QUERY)
                .fetch_all(&self.pool)
                .await
                .context("catalog introspection query failed")?;

        let mut schemas = Schemas::new();
        for (schema_name, table_name, primary_keys, column_names) in rows {
            let info = TableInfo {
                schema_name: schema_name.clone(),
                table_name: table_name.clone(),
                primary_keys: primary_keys.map(split_csv),
                columns: column_names.map(split_csv).unwrap_or_default(),
            };
            schemas
                .entry(schema_name)
                .or_default()
                .insert(table_name, info);
        }
        Ok(schemas)
    }

    /// Row count of one table.
    pub async fn record_count(&self, table: &TableInfo) -> Result<i64> {
        let sql = format!("select count(*) from {}", table.quoted_path());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("count failed for {}", table.qualified_name()))?;
        Ok(count)
    }
}

fn split_csv(joined: String) -> Vec<String> {
    joined.split(',').map(str::to_string).collect()
}

//! Subcommand implementations for the pgdelta CLI.

pub mod compare;
pub mod config;
pub mod histogram;
pub mod schemas;

use anyhow::Result;
use clap::ValueEnum;
use pgdelta_core::Config;
use pgdelta_diff::DatabaseProxy;

/// Which configured database a read-only command targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// The config section this side reads its connection from.
    pub fn section(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

/// Connect to one side of the configured pair.
pub async fn connect_side(config: &Config, side: Side) -> Result<DatabaseProxy> {
    let options = config.connection(side.section())?;
    DatabaseProxy::connect(options).await
}

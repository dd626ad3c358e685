//! Core building blocks for pgdelta: YAML configuration with dotted-path
//! access, environment overrides, fixed-width interval binning, and
//! structured errors. No database dependency lives here.

pub mod binning;
pub mod config;
pub mod dotpath;
pub mod error;

pub use binning::{BinSpec, Category};
pub use config::{Config, ConnectionOptions};
pub use error::{DeltaError, Result};

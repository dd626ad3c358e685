//! Database-facing half of pgdelta: catalog introspection, the
//! comparison engine, row-level diffing, and histogram execution.

pub mod compare;
pub mod histogram;
pub mod proxy;
pub mod rowdiff;
pub mod table;

pub use compare::{compare, CompareOptions, CompareReport, Finding};
pub use histogram::{run_histogram, HistogramRequest, HistogramRow};
pub use proxy::DatabaseProxy;
pub use rowdiff::RowDelta;
pub use table::TableInfo;

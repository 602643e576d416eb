pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod table;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::cleaner::CategorySchema;
pub use pipeline::RunSummary;
pub use table::{Column, ColumnKind, Table, Value};

//! Convenient imports for common functionality.

pub use crate::config::{PipelineConfig, PipelineConfigBuilder, normalize_endpoint};
pub use crate::database::PipelineDb;
pub use crate::error::SqlPipelineError;
pub use crate::executor::StatementExecutor;
pub use crate::query_builder::QueryBuilder;
pub use crate::results::{ExecOutcome, QueryResult, Record};
pub use crate::schema::{ColumnDef, ColumnStatus, SchemaReport, TableSchema};
pub use crate::types::RowValues;

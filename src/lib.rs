//! Stateless client for SQL engines exposed over HTTP with the batched pipeline protocol.
//!
//! Each [`PipelineDb::execute`] call is one HTTP POST carrying `[execute, close]`: there is
//! no pooled session and no transaction spanning calls. [`schema::ensure_schema`] performs
//! additive, idempotent migrations on top of that.

pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod jobs;
pub mod pipeline;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod schema;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use database::PipelineDb;
pub use error::SqlPipelineError;
pub use executor::StatementExecutor;
pub use results::{ExecOutcome, QueryResult, Record};
pub use types::RowValues;

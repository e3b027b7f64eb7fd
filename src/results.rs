//! Result Materializer: columnar execute payloads to ordered records.

pub mod materialize;
pub mod result_set;
pub mod row;

pub use materialize::materialize;
pub use result_set::{ExecOutcome, QueryResult};
pub use row::Record;

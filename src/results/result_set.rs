use super::row::Record;

/// How the remote answered an execute request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecOutcome {
    /// The statement ran and the result payload was materialized.
    #[default]
    Executed,
    /// The remote answered with a different response kind; there is nothing to materialize.
    NoResult { kind: String },
}

/// The materialized result of one `execute` call.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Rows in response order
    pub records: Vec<Record>,
    /// Rows changed by a DML statement (0 for reads)
    pub affected: u64,
    /// Row id of the last inserted row, when the remote reports one
    pub last_insert_id: Option<i64>,
    pub outcome: ExecOutcome,
}

impl QueryResult {
    /// Empty result for a non-execute response kind.
    #[must_use]
    pub fn no_result(kind: impl Into<String>) -> Self {
        Self {
            outcome: ExecOutcome::NoResult { kind: kind.into() },
            ..Self::default()
        }
    }

    /// True when the remote did not return an execute result at all, as opposed to an
    /// execute result with zero rows.
    #[must_use]
    pub fn is_no_result(&self) -> bool {
        matches!(self.outcome, ExecOutcome::NoResult { .. })
    }

    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Integer in `column` of the first row; handy for `COUNT(*)` style queries.
    #[must_use]
    pub fn scalar_int(&self, column: &str) -> Option<i64> {
        self.first().and_then(|row| row.int(column))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Schema Guard: create the table if absent, then add whichever expected columns the live
//! table lacks.
//!
//! There is no version table and no lock. Every statement is idempotent or safe to retry, so
//! concurrent processes racing through the same migration converge on the same schema.

use tracing::{debug, info, warn};

use crate::error::SqlPipelineError;
use crate::executor::StatementExecutor;

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    /// Trailing constraint clause, e.g. `PRIMARY KEY AUTOINCREMENT` or `NOT NULL`.
    pub constraints: String,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            constraints: String::new(),
        }
    }

    #[must_use]
    pub fn constraints(mut self, constraints: &str) -> Self {
        self.constraints = constraints.trim().to_string();
        self
    }

    /// Columns with constraints (keys, NOT NULL) cannot be added to an existing SQLite table.
    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.constraints.is_empty()
    }

    #[must_use]
    pub fn definition(&self) -> String {
        if self.constraints.is_empty() {
            format!("{} {}", self.name, self.sql_type)
        } else {
            format!("{} {} {}", self.name, self.sql_type, self.constraints)
        }
    }
}

/// Target shape of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn create_statement(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.definition()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{body}\n)", self.name)
    }

    #[must_use]
    pub fn introspect_statement(&self) -> String {
        format!("PRAGMA table_info({})", self.name)
    }

    #[must_use]
    pub fn add_column_statement(&self, column: &ColumnDef) -> String {
        format!("ALTER TABLE {} ADD COLUMN {}", self.name, column.definition())
    }
}

/// A column as reported by the live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnStatus {
    /// Already in the live table; nothing issued.
    Present,
    /// `ADD COLUMN` succeeded.
    Added,
    /// Missing, but its constraints rule out `ADD COLUMN`; nothing issued.
    NotAdditive,
    /// `ADD COLUMN` failed; the message is kept and the guard carried on.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOutcome {
    pub column: String,
    pub status: ColumnStatus,
}

/// Per-column result of [`ensure_schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub table: String,
    pub columns: Vec<ColumnOutcome>,
}

impl SchemaReport {
    /// Columns added by this run.
    #[must_use]
    pub fn added(&self) -> Vec<&str> {
        self.with_status(|s| matches!(s, ColumnStatus::Added))
    }

    /// Columns whose `ADD COLUMN` failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.with_status(|s| matches!(s, ColumnStatus::Failed(_)))
    }

    /// True when every expected column is now present.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.columns
            .iter()
            .all(|c| matches!(c.status, ColumnStatus::Present | ColumnStatus::Added))
    }

    fn with_status(&self, pred: impl Fn(&ColumnStatus) -> bool) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| pred(&c.status))
            .map(|c| c.column.as_str())
            .collect()
    }
}

/// Read the live column list of `table`.
///
/// # Errors
/// Propagates the executor's error.
pub async fn introspect<E: StatementExecutor + ?Sized>(
    executor: &E,
    schema: &TableSchema,
) -> Result<Vec<SchemaColumn>, SqlPipelineError> {
    let result = executor
        .execute(&schema.introspect_statement(), &[])
        .await?;
    Ok(result
        .records
        .iter()
        .filter_map(|row| {
            Some(SchemaColumn {
                name: row.text("name")?.to_string(),
                declared_type: row.text("type").unwrap_or_default().to_string(),
            })
        })
        .collect())
}

/// Bring the live table up to `schema`.
///
/// # Errors
/// Fails only when the create or the introspection statement fails. Individual
/// `ADD COLUMN` failures are recorded in the report as [`ColumnStatus::Failed`].
pub async fn ensure_schema<E: StatementExecutor + ?Sized>(
    executor: &E,
    schema: &TableSchema,
) -> Result<SchemaReport, SqlPipelineError> {
    executor.execute(&schema.create_statement(), &[]).await?;
    let live = introspect(executor, schema).await?;

    let mut columns = Vec::with_capacity(schema.columns.len());
    for column in &schema.columns {
        let status = if live.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
            ColumnStatus::Present
        } else if !column.is_additive() {
            warn!(table = %schema.name, column = %column.name, "missing column cannot be added");
            ColumnStatus::NotAdditive
        } else {
            match executor
                .execute(&schema.add_column_statement(column), &[])
                .await
            {
                Ok(_) => {
                    info!(table = %schema.name, column = %column.name, "added column");
                    ColumnStatus::Added
                }
                Err(e) => {
                    warn!(table = %schema.name, column = %column.name, error = %e, "add column failed");
                    ColumnStatus::Failed(e.to_string())
                }
            }
        };
        columns.push(ColumnOutcome {
            column: column.name.clone(),
            status,
        });
    }

    debug!(table = %schema.name, live = live.len(), "schema guard finished");
    Ok(SchemaReport {
        table: schema.name.clone(),
        columns,
    })
}

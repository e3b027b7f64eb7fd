//! The job-application table and the queries the tracker runs against it.
//!
//! `job_type` and `status` are stored as free-form text: the suggested labels below are
//! offered to users but never enforced, since the set drifts over time.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::SqlPipelineError;
use crate::executor::StatementExecutor;
use crate::results::Record;
use crate::schema::{ColumnDef, TableSchema};
use crate::types::RowValues;

pub const TABLE: &str = "jobs";

pub const JOB_TYPES: [&str; 6] = [
    "kontrak",
    "fulltime",
    "freelance",
    "remote",
    "hybrid",
    "part time",
];

pub const STATUSES: [&str; 8] = [
    "dilamar",
    "ditolak",
    "diterima",
    "tidak ada respon",
    "interview",
    "tes tulis",
    "psikotes",
    "mini project",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Target schema of the `jobs` table.
#[must_use]
pub fn table_schema() -> TableSchema {
    let text = |name: &str| ColumnDef::new(name, "TEXT");
    TableSchema::new(TABLE)
        .column(ColumnDef::new("id", "INTEGER").constraints("PRIMARY KEY AUTOINCREMENT"))
        .column(text("company_name").constraints("NOT NULL"))
        .column(text("job_title").constraints("NOT NULL"))
        .column(text("location"))
        .column(text("job_type"))
        .column(text("applied_date"))
        .column(text("updated_date"))
        .column(text("status"))
        .column(text("salary"))
        .column(text("source_link"))
        .column(text("source_text"))
        .column(text("created_at"))
        .column(text("updated_at"))
}

/// Editable fields of an application, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub company_name: String,
    pub job_title: String,
    pub location: String,
    pub job_type: String,
    /// `YYYY-MM-DD`
    pub applied_date: String,
    /// `YYYY-MM-DD`
    pub updated_date: String,
    pub status: String,
    /// Free text: a number or a range.
    pub salary: String,
    pub source_link: String,
    pub source_text: String,
}

impl NewJob {
    /// Field values in column order, trimmed.
    fn field_params(&self) -> Vec<RowValues> {
        [
            &self.company_name,
            &self.job_title,
            &self.location,
            &self.job_type,
            &self.applied_date,
            &self.updated_date,
            &self.status,
            &self.salary,
            &self.source_link,
            &self.source_text,
        ]
        .into_iter()
        .map(|v| RowValues::Text(v.trim().to_string()))
        .collect()
    }
}

/// One stored application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: i64,
    pub company_name: String,
    pub job_title: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub applied_date: Option<String>,
    pub updated_date: Option<String>,
    pub status: Option<String>,
    pub salary: Option<String>,
    pub source_link: Option<String>,
    pub source_text: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Job {
    /// Map a `SELECT *` row; `None` if the id is missing.
    #[must_use]
    pub fn from_record(row: &Record) -> Option<Self> {
        let opt = |name: &str| row.text(name).map(str::to_string);
        Some(Self {
            id: row.int("id")?,
            company_name: opt("company_name").unwrap_or_default(),
            job_title: opt("job_title").unwrap_or_default(),
            location: opt("location"),
            job_type: opt("job_type"),
            applied_date: opt("applied_date"),
            updated_date: opt("updated_date"),
            status: opt("status"),
            salary: opt("salary"),
            source_link: opt("source_link"),
            source_text: opt("source_text"),
            created_at: opt("created_at"),
            updated_at: opt("updated_at"),
        })
    }
}

/// Headline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub interview: i64,
}

/// Queries over the `jobs` table, one pipeline call each.
pub struct JobRepository<'e, E: StatementExecutor + ?Sized> {
    executor: &'e E,
}

impl<'e, E: StatementExecutor + ?Sized> JobRepository<'e, E> {
    #[must_use]
    pub fn new(executor: &'e E) -> Self {
        Self { executor }
    }

    /// Insert and return the new row id.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn create(&self, job: &NewJob) -> Result<Option<i64>, SqlPipelineError> {
        let now = now_stamp();
        let mut params = job.field_params();
        params.push(RowValues::Text(now.clone()));
        params.push(RowValues::Text(now));

        let result = self
            .executor
            .execute(
                "INSERT INTO jobs (company_name, job_title, location, job_type, applied_date, updated_date, status, salary, source_link, source_text, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &params,
            )
            .await?;
        Ok(result.last_insert_id)
    }

    /// Overwrite every editable field of `id` and stamp `updated_at`.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn update(&self, id: i64, job: &NewJob) -> Result<u64, SqlPipelineError> {
        let mut params = job.field_params();
        params.push(RowValues::Text(now_stamp()));
        params.push(RowValues::Int(id));

        let result = self
            .executor
            .execute(
                "UPDATE jobs SET company_name=?, job_title=?, location=?, job_type=?, applied_date=?, updated_date=?, status=?, salary=?, source_link=?, source_text=?, updated_at=? WHERE id=?",
                &params,
            )
            .await?;
        Ok(result.affected)
    }

    /// # Errors
    /// Propagates the executor's error.
    pub async fn delete(&self, id: i64) -> Result<u64, SqlPipelineError> {
        let result = self
            .executor
            .execute("DELETE FROM jobs WHERE id = ?", &[RowValues::Int(id)])
            .await?;
        Ok(result.affected)
    }

    /// All rows, newest first.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn list(&self) -> Result<Vec<Job>, SqlPipelineError> {
        let result = self
            .executor
            .execute("SELECT * FROM jobs ORDER BY id DESC", &[])
            .await?;
        Ok(result.records.iter().filter_map(Job::from_record).collect())
    }

    /// # Errors
    /// Propagates the executor's error.
    pub async fn count(&self) -> Result<i64, SqlPipelineError> {
        let result = self
            .executor
            .execute("SELECT COUNT(*) AS n FROM jobs", &[])
            .await?;
        Ok(result.scalar_int("n").unwrap_or(0))
    }

    /// # Errors
    /// Propagates the executor's error.
    pub async fn count_by_status(&self, status: &str) -> Result<i64, SqlPipelineError> {
        let result = self
            .executor
            .execute(
                "SELECT COUNT(*) AS n FROM jobs WHERE status = ?",
                &[RowValues::Text(status.to_string())],
            )
            .await?;
        Ok(result.scalar_int("n").unwrap_or(0))
    }

    /// # Errors
    /// Propagates the executor's error.
    pub async fn stats(&self) -> Result<JobStats, SqlPipelineError> {
        Ok(JobStats {
            total: self.count().await?,
            accepted: self.count_by_status("diterima").await?,
            rejected: self.count_by_status("ditolak").await?,
            interview: self.count_by_status("interview").await?,
        })
    }

    /// `(status, count)` pairs; NULL status is grouped as `""`.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn group_by_status(&self) -> Result<Vec<(String, i64)>, SqlPipelineError> {
        self.grouped("SELECT COALESCE(status,'') AS grp, COUNT(*) AS cnt FROM jobs GROUP BY grp")
            .await
    }

    /// `(job_type, count)` pairs; NULL type is grouped as `""`.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn group_by_type(&self) -> Result<Vec<(String, i64)>, SqlPipelineError> {
        self.grouped("SELECT COALESCE(job_type,'') AS grp, COUNT(*) AS cnt FROM jobs GROUP BY grp")
            .await
    }

    /// Applications per `YYYY-MM` of `applied_date`, oldest month first.
    ///
    /// # Errors
    /// Propagates the executor's error.
    pub async fn monthly_trend(&self) -> Result<Vec<(String, i64)>, SqlPipelineError> {
        let rows = self
            .grouped(
                "SELECT substr(applied_date,1,7) AS grp, COUNT(*) AS cnt FROM jobs \
                 WHERE applied_date IS NOT NULL AND applied_date != '' GROUP BY grp ORDER BY grp",
            )
            .await?;
        Ok(rows.into_iter().filter(|(ym, _)| !ym.is_empty()).collect())
    }

    async fn grouped(&self, sql: &str) -> Result<Vec<(String, i64)>, SqlPipelineError> {
        let result = self.executor.execute(sql, &[]).await?;
        Ok(result
            .records
            .iter()
            .map(|row| {
                let key = row
                    .get("grp")
                    .map(RowValues::to_display_string)
                    .unwrap_or_default();
                (key, row.int("cnt").unwrap_or(0))
            })
            .collect())
    }
}

fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

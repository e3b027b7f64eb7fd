mod common;

use common::FakePipeline;
use sql_pipeline::jobs::{self, JobRepository, NewJob};
use sql_pipeline::prelude::*;
use sql_pipeline::schema::introspect;

fn alter_statements(server: &FakePipeline) -> Vec<String> {
    server
        .statements()
        .into_iter()
        .filter(|s| s.starts_with("ALTER TABLE"))
        .collect()
}

#[test]
fn test03_fresh_database_gets_full_table() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let server = FakePipeline::spawn().await;
        let db = server.db();

        let report = db.ensure_schema(&jobs::table_schema()).await?;
        assert!(report.is_clean());
        assert!(report.added().is_empty());
        assert_eq!(report.columns.len(), 13);
        assert!(alter_statements(&server).is_empty());

        let live = introspect(&db, &jobs::table_schema()).await?;
        assert_eq!(live.len(), 13);
        assert_eq!(live[0].name, "id");
        assert_eq!(live[0].declared_type, "INTEGER");
        Ok::<(), SqlPipelineError>(())
    })?;
    Ok(())
}

#[test]
fn test03_legacy_table_is_upgraded_once() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let server = FakePipeline::spawn().await;
        server.seed(
            "CREATE TABLE jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_name TEXT NOT NULL,
                job_title TEXT NOT NULL,
                location TEXT, job_type TEXT, applied_date TEXT, updated_date TEXT,
                status TEXT, source_link TEXT, created_at TEXT, updated_at TEXT
            );
            INSERT INTO jobs (company_name, job_title, status) VALUES ('Old Co', 'Analyst', 'dilamar');",
        );
        let db = server.db();

        let first = db.ensure_schema(&jobs::table_schema()).await?;
        assert_eq!(first.added(), vec!["salary", "source_text"]);
        assert!(first.is_clean());
        assert_eq!(
            alter_statements(&server),
            vec![
                "ALTER TABLE jobs ADD COLUMN salary TEXT",
                "ALTER TABLE jobs ADD COLUMN source_text TEXT",
            ]
        );

        let second = db.ensure_schema(&jobs::table_schema()).await?;
        assert!(second.added().is_empty());
        assert!(second.columns.iter().all(|c| c.status == ColumnStatus::Present));
        assert_eq!(alter_statements(&server).len(), 2, "no ALTER on the second run");

        let rows = db.query("SELECT company_name, salary FROM jobs").select().await?;
        assert_eq!(rows[0].text("company_name"), Some("Old Co"));
        assert!(rows[0].get("salary").is_some_and(RowValues::is_null));
        Ok::<(), SqlPipelineError>(())
    })?;
    Ok(())
}

#[test]
fn test03_create_failure_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let server = FakePipeline::spawn().await;
        server.respond_with(500, "database unavailable");

        let err = server
            .db()
            .ensure_schema(&jobs::table_schema())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(server.requests().len(), 1);
        Ok::<(), SqlPipelineError>(())
    })?;
    Ok(())
}

#[test]
fn test03_job_repository_flow() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let server = FakePipeline::spawn().await;
        let db = server.db();
        db.ensure_schema(&jobs::table_schema()).await?;
        let repo = JobRepository::new(&db);

        assert_eq!(repo.count().await?, 0);

        let acme = NewJob {
            company_name: " Acme ".into(),
            job_title: "Engineer".into(),
            job_type: "remote".into(),
            applied_date: "2025-01-15".into(),
            status: "interview".into(),
            salary: "10-12jt".into(),
            ..NewJob::default()
        };
        let acme_id = repo.create(&acme).await?.expect("rowid");
        let initech = NewJob {
            company_name: "Initech".into(),
            job_title: "Analyst".into(),
            applied_date: "2025-02-03".into(),
            status: "ditolak".into(),
            ..NewJob::default()
        };
        let initech_id = repo.create(&initech).await?.expect("rowid");
        assert!(initech_id > acme_id);

        let listed = repo.list().await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, initech_id, "newest first");
        assert_eq!(listed[1].company_name, "Acme");
        assert_eq!(listed[1].salary.as_deref(), Some("10-12jt"));
        assert!(listed[1].created_at.is_some());

        let stats = repo.stats().await?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.interview, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.accepted, 0);

        let by_type = repo.group_by_type().await?;
        assert!(by_type.contains(&("remote".to_string(), 1)));
        assert!(by_type.contains(&(String::new(), 1)));
        assert_eq!(
            repo.monthly_trend().await?,
            vec![("2025-01".to_string(), 1), ("2025-02".to_string(), 1)]
        );

        let hired = NewJob {
            status: "diterima".into(),
            ..acme
        };
        assert_eq!(repo.update(acme_id, &hired).await?, 1);
        assert_eq!(repo.count_by_status("diterima").await?, 1);
        assert!(repo.group_by_status().await?.contains(&("diterima".to_string(), 1)));

        assert_eq!(repo.delete(initech_id).await?, 1);
        assert_eq!(repo.delete(initech_id).await?, 0);
        assert_eq!(repo.count().await?, 1);
        Ok::<(), SqlPipelineError>(())
    })?;
    Ok(())
}

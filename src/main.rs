use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value as JsonValue, json};
use tracing::Level;

use sql_pipeline::config::{ENV_TIMEOUT_SECS, ENV_TOKEN, ENV_URL};
use sql_pipeline::jobs::{self, JobRepository};
use sql_pipeline::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run SQL against a pipeline endpoint")]
struct Args {
    /// Endpoint: libsql://host or http(s)://host[/v2/pipeline]
    #[arg(long, env = ENV_URL, default_value = "")]
    url: String,
    /// Bearer credential
    #[arg(long, env = ENV_TOKEN, default_value = "", hide_env_values = true)]
    token: String,
    /// Per-request deadline
    #[arg(long, env = ENV_TIMEOUT_SECS, default_value_t = 30)]
    timeout_secs: u64,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or upgrade the jobs table and print the per-column report
    Migrate,
    /// Execute one statement and print its records as JSON lines
    Exec {
        sql: String,
        /// Positional parameter: null, int:<n>, float:<f>, text:<s>; anything else is text
        #[arg(long = "param", short = 'p')]
        params: Vec<String>,
    },
    /// Migrate, then print job counts
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = match PipelineConfig::builder(&args.url, &args.token)
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
    {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    let db = match PipelineDb::new(config) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match run(&db, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(db: &PipelineDb, command: Command) -> Result<(), SqlPipelineError> {
    match command {
        Command::Migrate => {
            let report = db.ensure_schema(&jobs::table_schema()).await?;
            for outcome in &report.columns {
                println!("{}.{}: {:?}", report.table, outcome.column, outcome.status);
            }
        }
        Command::Exec { sql, params } => {
            let params: Vec<RowValues> = params.iter().map(|p| parse_param(p)).collect();
            let result = db.execute(&sql, &params).await?;
            for record in &result.records {
                println!("{}", record_to_json(record));
            }
            let summary = json!({
                "affected": result.affected,
                "last_insert_id": result.last_insert_id,
                "no_result": result.is_no_result(),
            });
            eprintln!("{summary}");
        }
        Command::Stats => {
            db.ensure_schema(&jobs::table_schema()).await?;
            let repo = JobRepository::new(db);
            let stats = repo.stats().await?;
            let summary = json!({
                "stats": stats,
                "by_status": repo.group_by_status().await?,
                "by_type": repo.group_by_type().await?,
                "monthly": repo.monthly_trend().await?,
            });
            println!("{summary}");
        }
    }
    Ok(())
}

fn parse_param(raw: &str) -> RowValues {
    if raw == "null" {
        return RowValues::Null;
    }
    if let Some(n) = raw.strip_prefix("int:") {
        if let Ok(n) = n.parse() {
            return RowValues::Int(n);
        }
    }
    if let Some(f) = raw.strip_prefix("float:") {
        if let Ok(f) = f.parse() {
            return RowValues::Float(f);
        }
    }
    if let Some(s) = raw.strip_prefix("text:") {
        return RowValues::Text(s.to_string());
    }
    RowValues::Text(raw.to_string())
}

fn record_to_json(record: &Record) -> JsonValue {
    let mut map = Map::new();
    for (name, value) in record.iter() {
        let v = match value {
            RowValues::Null => JsonValue::Null,
            RowValues::Int(i) => json!(i),
            RowValues::Float(f) => json!(f),
            RowValues::Text(s) => json!(s),
            RowValues::Blob(bytes) => json!(bytes),
        };
        map.insert(name.to_string(), v);
    }
    JsonValue::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_by_prefix() {
        assert_eq!(parse_param("null"), RowValues::Null);
        assert_eq!(parse_param("int:5"), RowValues::Int(5));
        assert_eq!(parse_param("float:2.5"), RowValues::Float(2.5));
        assert_eq!(parse_param("text:int:5"), RowValues::Text("int:5".into()));
        assert_eq!(parse_param("int:x"), RowValues::Text("int:x".into()));
        assert_eq!(parse_param("Acme"), RowValues::Text("Acme".into()));
    }

    #[test]
    #[allow(unsafe_code)]
    fn timeout_falls_back_to_env() {
        // SAFETY: the only test in this binary that touches the environment.
        unsafe { std::env::set_var(ENV_TIMEOUT_SECS, "7") };
        let from_env = Args::try_parse_from(["sql-pipeline", "migrate"]).unwrap();
        let from_flag =
            Args::try_parse_from(["sql-pipeline", "--timeout-secs", "3", "migrate"]).unwrap();
        unsafe { std::env::remove_var(ENV_TIMEOUT_SECS) };
        let default = Args::try_parse_from(["sql-pipeline", "migrate"]).unwrap();

        assert_eq!(from_env.timeout_secs, 7);
        assert_eq!(from_flag.timeout_secs, 3);
        assert_eq!(default.timeout_secs, 30);
    }
}

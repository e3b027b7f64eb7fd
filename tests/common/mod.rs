//! Local pipeline endpoint backed by an in-memory SQLite database.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;
use serde_json::{Value as JsonValue, json};

use sql_pipeline::prelude::*;

pub const TOKEN: &str = "test-token";

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: JsonValue,
}

struct ServerState {
    conn: Mutex<Connection>,
    log: Mutex<Vec<LoggedRequest>>,
    canned: Mutex<Option<(u16, String)>>,
    delay: Mutex<Option<Duration>>,
}

pub struct FakePipeline {
    pub base_url: String,
    state: Arc<ServerState>,
}

impl FakePipeline {
    pub async fn spawn() -> Self {
        let state = Arc::new(ServerState {
            conn: Mutex::new(Connection::open_in_memory().expect("open sqlite")),
            log: Mutex::new(Vec::new()),
            canned: Mutex::new(None),
            delay: Mutex::new(None),
        });
        let app = Router::new()
            .route("/v2/pipeline", post(pipeline))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake pipeline");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn db(&self) -> PipelineDb {
        self.db_with(|b| b)
    }

    pub fn db_with(
        &self,
        configure: impl FnOnce(PipelineConfigBuilder) -> PipelineConfigBuilder,
    ) -> PipelineDb {
        let config = configure(PipelineConfig::builder(&self.base_url, TOKEN))
            .build()
            .expect("valid config");
        PipelineDb::new(config).expect("client")
    }

    /// Answer every following request with this status and raw body.
    pub fn respond_with(&self, status: u16, body: &str) {
        *self.state.canned.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn delay_responses(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.state.log.lock().unwrap().clone()
    }

    /// SQL text of every executed statement, in arrival order.
    pub fn statements(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.body["requests"][0]["stmt"]["sql"].as_str().map(str::to_string))
            .collect()
    }

    /// Run SQL directly against the backing database.
    pub fn seed(&self, sql: &str) {
        self.state
            .conn
            .lock()
            .unwrap()
            .execute_batch(sql)
            .expect("seed sql");
    }
}

async fn pipeline(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let parsed: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    state.log.lock().unwrap().push(LoggedRequest {
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: parsed.clone(),
    });

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let canned = state.canned.lock().unwrap().clone();
    if let Some((status, body)) = canned {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
        return (status, body).into_response();
    }

    if header_str(header::AUTHORIZATION).as_deref() != Some(format!("Bearer {TOKEN}").as_str()) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized: invalid token").into_response();
    }
    let Some(requests) = parsed["requests"].as_array() else {
        return (StatusCode::BAD_REQUEST, "missing requests").into_response();
    };

    let conn = state.conn.lock().unwrap();
    let results: Vec<JsonValue> = requests
        .iter()
        .map(|req| match req["type"].as_str() {
            Some("execute") => match run_statement(&conn, &req["stmt"]) {
                Ok(result) => json!({"type": "ok", "response": {"type": "execute", "result": result}}),
                Err(e) => json!({"type": "error", "error": {"message": e.to_string(), "code": "SQLITE_ERROR"}}),
            },
            Some("close") => json!({"type": "ok", "response": {"type": "close"}}),
            other => json!({"type": "error", "error": {"message": format!("unknown request {other:?}")}}),
        })
        .collect();
    drop(conn);

    axum::Json(json!({"baton": null, "base_url": null, "results": results})).into_response()
}

fn run_statement(conn: &Connection, stmt: &JsonValue) -> rusqlite::Result<JsonValue> {
    let sql = stmt["sql"].as_str().unwrap_or_default();
    let args: Vec<SqlValue> = stmt["args"]
        .as_array()
        .map(|args| args.iter().map(arg_value).collect())
        .unwrap_or_default();

    let mut prepared = conn.prepare(sql)?;
    let readonly = prepared.readonly();
    let cols: Vec<JsonValue> = prepared
        .column_names()
        .iter()
        .map(|name| json!({"name": name, "decltype": null}))
        .collect();
    let col_count = prepared.column_count();

    let mut out_rows = Vec::new();
    let mut rows = prepared.query(rusqlite::params_from_iter(args.iter()))?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(col_count);
        for i in 0..col_count {
            cells.push(cell_json(row.get::<_, SqlValue>(i)?));
        }
        out_rows.push(JsonValue::Array(cells));
    }
    drop(rows);

    let (affected, last_id) = if readonly {
        (0, JsonValue::Null)
    } else {
        (conn.changes() as i64, json!(conn.last_insert_rowid().to_string()))
    };
    Ok(json!({
        "cols": cols,
        "rows": out_rows,
        "affected_row_count": affected,
        "last_insert_rowid": last_id,
    }))
}

fn arg_value(arg: &JsonValue) -> SqlValue {
    let value = &arg["value"];
    match arg["type"].as_str() {
        Some("integer") => value
            .as_str()
            .and_then(|s| s.parse().ok())
            .or_else(|| value.as_i64())
            .map_or(SqlValue::Null, SqlValue::Integer),
        Some("float") => value
            .as_str()
            .and_then(|s| s.parse().ok())
            .or_else(|| value.as_f64())
            .map_or(SqlValue::Null, SqlValue::Real),
        Some("text") => SqlValue::Text(value.as_str().unwrap_or_default().to_string()),
        Some("blob") => arg["base64"]
            .as_str()
            .and_then(|b| BASE64.decode(b).ok())
            .map_or(SqlValue::Null, SqlValue::Blob),
        _ => SqlValue::Null,
    }
}

fn cell_json(value: SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => json!({"type": "null"}),
        SqlValue::Integer(i) => json!({"type": "integer", "value": i.to_string()}),
        SqlValue::Real(f) => json!({"type": "float", "value": f}),
        SqlValue::Text(s) => json!({"type": "text", "value": s}),
        SqlValue::Blob(b) => json!({"type": "blob", "base64": BASE64.encode(b)}),
    }
}

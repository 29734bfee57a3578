use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEFAULT_TABLE: &str = "todos";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct InsertRow {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Inserts accept a single object or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InsertBody {
    Many(Vec<InsertRow>),
    One(InsertRow),
}

impl InsertBody {
    fn into_rows(self) -> Vec<InsertRow> {
        match self {
            InsertBody::Many(rows) => rows,
            InsertBody::One(row) => vec![row],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchRow {
    pub completed: Option<bool>,
}

/// Error body in the shape PostgREST uses.
#[derive(Debug, Serialize, Deserialize)]
pub struct PgError {
    pub code: String,
    pub message: String,
}

type Rejection = (StatusCode, Json<PgError>);

fn pg_error(status: StatusCode, code: &str, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(PgError {
            code: code.to_string(),
            message: message.into(),
        }),
    )
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub table: String,
    /// When set, every request must present it in the `apikey` header.
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            api_key: None,
        }
    }
}

pub type Db = Arc<RwLock<Vec<Row>>>;

#[derive(Clone)]
struct AppState {
    table: Arc<str>,
    api_key: Option<Arc<str>>,
    db: Db,
}

pub fn app() -> Router {
    app_with(ServerConfig::default())
}

pub fn app_with(config: ServerConfig) -> Router {
    let state = AppState {
        table: config.table.into(),
        api_key: config.api_key.map(Into::into),
        db: Arc::new(RwLock::new(Vec::new())),
    };
    Router::new()
        .route(
            "/rest/v1/{table}",
            get(list_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(req).await;
    };
    let presented = req.headers().get("apikey").and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        next.run(req).await
    } else {
        tracing::debug!("rejecting request without a valid apikey");
        pg_error(StatusCode::UNAUTHORIZED, "PGRST301", "Invalid API key").into_response()
    }
}

fn check_table(state: &AppState, table: &str) -> Result<(), Rejection> {
    if table == &*state.table {
        return Ok(());
    }
    Err(pg_error(
        StatusCode::NOT_FOUND,
        "42P01",
        format!("relation \"public.{table}\" does not exist"),
    ))
}

/// Parse an `id=eq.<uuid>` filter if one is present.
fn id_filter(params: &HashMap<String, String>) -> Result<Option<Uuid>, Rejection> {
    let Some(raw) = params.get("id") else {
        return Ok(None);
    };
    let value = raw.strip_prefix("eq.").ok_or_else(|| {
        pg_error(
            StatusCode::BAD_REQUEST,
            "PGRST100",
            format!("unsupported filter on id: {raw}"),
        )
    })?;
    Uuid::parse_str(value).map(Some).map_err(|_| {
        pg_error(
            StatusCode::BAD_REQUEST,
            "22P02",
            format!("invalid input syntax for type uuid: \"{value}\""),
        )
    })
}

/// Mutations without a filter would touch every row.
fn required_id_filter(params: &HashMap<String, String>) -> Result<Uuid, Rejection> {
    id_filter(params)?.ok_or_else(|| {
        pg_error(
            StatusCode::BAD_REQUEST,
            "21000",
            "a filter on id is required",
        )
    })
}

/// Apply an `order=created_at[.asc|.desc]` parameter.
fn sort_rows(rows: &mut [Row], order: Option<&str>) -> Result<(), Rejection> {
    let Some(order) = order else {
        return Ok(());
    };
    let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
    if column != "created_at" {
        return Err(pg_error(
            StatusCode::BAD_REQUEST,
            "42703",
            format!("column todos.{column} does not exist"),
        ));
    }
    match direction {
        "asc" => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        "desc" => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        other => {
            return Err(pg_error(
                StatusCode::BAD_REQUEST,
                "PGRST100",
                format!("unknown order direction: {other}"),
            ))
        }
    }
    Ok(())
}

fn wants_representation(headers: &HeaderMap) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(',').any(|p| p.trim() == "return=representation"))
}

/// Insertion time, strictly later than every existing row.
fn next_timestamp(rows: &[Row]) -> DateTime<Utc> {
    let now = Utc::now();
    match rows.iter().map(|r| r.created_at).max() {
        Some(last) if last >= now => last + Duration::microseconds(1),
        _ => now,
    }
}

async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Row>>, Rejection> {
    check_table(&state, &table)?;
    let id = id_filter(&params)?;
    let mut rows: Vec<Row> = state
        .db
        .read()
        .await
        .iter()
        .filter(|r| id.map_or(true, |id| r.id == id))
        .cloned()
        .collect();
    sort_rows(&mut rows, params.get("order").map(String::as_str))?;
    Ok(Json(rows))
}

async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<InsertBody>,
) -> Result<Response, Rejection> {
    check_table(&state, &table)?;
    let input = body.into_rows();
    if input.iter().any(|r| r.text.trim().is_empty()) {
        return Err(pg_error(
            StatusCode::BAD_REQUEST,
            "23514",
            format!("new row for relation \"{table}\" violates check constraint \"todos_text_check\""),
        ));
    }

    let mut db = state.db.write().await;
    let mut created = Vec::with_capacity(input.len());
    for row in input {
        let row = Row {
            id: Uuid::new_v4(),
            text: row.text,
            completed: row.completed,
            created_at: next_timestamp(&db),
        };
        db.push(row.clone());
        created.push(row);
    }
    tracing::info!(count = created.len(), "inserted rows");

    if wants_representation(&headers) {
        Ok((StatusCode::CREATED, Json(created)).into_response())
    } else {
        Ok(StatusCode::CREATED.into_response())
    }
}

async fn update_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(patch): Json<PatchRow>,
) -> Result<Response, Rejection> {
    check_table(&state, &table)?;
    let id = required_id_filter(&params)?;

    let mut db = state.db.write().await;
    let mut updated = Vec::new();
    for row in db.iter_mut().filter(|r| r.id == id) {
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }
        updated.push(row.clone());
    }
    tracing::info!(%id, count = updated.len(), "updated rows");

    if wants_representation(&headers) {
        Ok(Json(updated).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

async fn delete_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, Rejection> {
    check_table(&state, &table)?;
    let id = required_id_filter(&params)?;

    let mut db = state.db.write().await;
    let (removed, kept): (Vec<Row>, Vec<Row>) = db.drain(..).partition(|r| r.id == id);
    *db = kept;
    tracing::info!(%id, count = removed.len(), "deleted rows");

    if wants_representation(&headers) {
        Ok(Json(removed).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

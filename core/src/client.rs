//! Stateless request builder and response parser for the `todos` table.
//!
//! # Design
//! `TableClient` holds the table URL and the key headers and nothing else.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! the wire dialect can be tested without a network.
//!
//! The dialect is PostgREST's: filters and ordering live in the query string
//! (`id=eq.<id>`, `order=created_at.desc`) and mutations ask for
//! `return=minimal`, so the store acknowledges them without echoing rows.

use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{sort_newest_first, CompletionPatch, NewTask, Task, TaskId};

const REST_PREFIX: &str = "rest/v1";
const LIST_QUERY: &str = "select=*&order=created_at.desc";
const PREFER_MINIMAL: &str = "return=minimal";

/// Synchronous, stateless client for one table.
#[derive(Debug, Clone)]
pub struct TableClient {
    table_url: String,
    auth_headers: Vec<(String, String)>,
}

impl TableClient {
    pub fn new(config: &StoreConfig) -> Self {
        let base = config.url.trim_end_matches('/');
        let auth_headers = match &config.api_key {
            Some(key) => vec![
                ("apikey".to_string(), key.clone()),
                ("authorization".to_string(), format!("Bearer {key}")),
            ],
            None => Vec::new(),
        };
        Self {
            table_url: format!("{base}/{REST_PREFIX}/{}", config.table),
            auth_headers,
        }
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}?{LIST_QUERY}", self.table_url),
            headers: self.headers(&[]),
            body: None,
        }
    }

    pub fn build_create_task(&self, input: &NewTask) -> Result<HttpRequest, ApiError> {
        // PostgREST inserts take an array of rows.
        let body = serde_json::to_string(std::slice::from_ref(input))
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.table_url.clone(),
            headers: self.headers(&[
                ("content-type", "application/json"),
                ("prefer", PREFER_MINIMAL),
            ]),
            body: Some(body),
        })
    }

    pub fn build_set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&CompletionPatch { completed })
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: self.row_url(id),
            headers: self.headers(&[
                ("content-type", "application/json"),
                ("prefer", PREFER_MINIMAL),
            ]),
            body: Some(body),
        })
    }

    pub fn build_delete_task(&self, id: &TaskId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.row_url(id),
            headers: self.headers(&[("prefer", PREFER_MINIMAL)]),
            body: None,
        }
    }

    /// Parse the list response and guarantee newest-first order.
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_success(&response)?;
        let mut tasks: Vec<Task> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_set_completed(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_success(&response)
    }

    fn row_url(&self, id: &TaskId) -> String {
        format!("{}?id=eq.{id}", self.table_url)
    }

    fn headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers = self.auth_headers.clone();
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        headers
    }
}

/// Map any non-2xx status to `ApiError::Http`.
fn check_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TableClient {
        TableClient::new(&StoreConfig::new("http://localhost:3000"))
    }

    fn keyed_client() -> TableClient {
        TableClient::new(&StoreConfig::new("http://localhost:3000").with_api_key("anon-key"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_tasks_orders_by_created_at_desc() {
        let req = client().build_list_tasks();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/rest/v1/todos?select=*&order=created_at.desc"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn api_key_is_sent_on_every_request() {
        let c = keyed_client();
        let id = TaskId::new("1");
        let new = NewTask::from_input("x").unwrap();
        let requests = vec![
            c.build_list_tasks(),
            c.build_create_task(&new).unwrap(),
            c.build_set_completed(&id, true).unwrap(),
            c.build_delete_task(&id),
        ];
        for req in requests {
            assert_eq!(req.header("apikey"), Some("anon-key"), "{:?}", req.method);
            assert_eq!(req.header("Authorization"), Some("Bearer anon-key"));
        }
    }

    #[test]
    fn build_create_task_sends_single_row_array() {
        let input = NewTask::from_input("  Buy milk ").unwrap();
        let req = client().build_create_task(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/rest/v1/todos");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("prefer"), Some("return=minimal"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!([{"text": "Buy milk", "completed": false}]));
    }

    #[test]
    fn build_set_completed_filters_by_id() {
        let id = TaskId::from(uuid::Uuid::from_u128(7));
        let req = client().build_set_completed(&id, true).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(
            req.url,
            "http://localhost:3000/rest/v1/todos?id=eq.00000000-0000-0000-0000-000000000007"
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }

    #[test]
    fn build_delete_task_filters_by_id() {
        let req = client().build_delete_task(&TaskId::new("17"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/rest/v1/todos?id=eq.17");
        assert!(req.body.is_none());
    }

    #[test]
    fn custom_table_and_trailing_slash() {
        let mut config = StoreConfig::new("https://example.supabase.co/");
        config.table = "chores".to_string();
        let c = TableClient::new(&config);
        assert_eq!(c.table_url(), "https://example.supabase.co/rest/v1/chores");
    }

    #[test]
    fn parse_list_tasks_resorts_newest_first() {
        let body = r#"[
            {"id":"00000000-0000-0000-0000-000000000001","text":"old","completed":false,"created_at":"2024-01-01T00:00:00Z"},
            {"id":"00000000-0000-0000-0000-000000000002","text":"new","completed":true,"created_at":"2024-02-01T00:00:00Z"}
        ]"#;
        let tasks = client().parse_list_tasks(response(200, body)).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "new");
        assert_eq!(tasks[1].text, "old");
    }

    #[test]
    fn parse_list_tasks_accepts_identity_keyed_rows() {
        let body = r#"[
            {"id":1,"text":"first","completed":false,"created_at":"2024-05-01T10:00:00.123456+00:00"},
            {"id":2,"text":"second","completed":true,"created_at":"2024-05-02T10:00:00.5+00:00"}
        ]"#;
        let tasks = client().parse_list_tasks(response(200, body)).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let req = client().build_delete_task(&tasks[0].id);
        assert!(req.url.ends_with("?id=eq.2"));
    }

    #[test]
    fn parse_list_tasks_accepts_timestamps_without_offset() {
        let body = r#"[
            {"id":"00000000-0000-0000-0000-000000000001","text":"old","completed":false,"created_at":"2024-05-01T10:00:00.123456"},
            {"id":"00000000-0000-0000-0000-000000000002","text":"new","completed":false,"created_at":"2024-05-01 11:00:00"}
        ]"#;
        let tasks = client().parse_list_tasks(response(200, body)).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "new");
        assert!(tasks.iter().all(|t| t.created_at.is_some()));
    }

    #[test]
    fn unreadable_timestamps_keep_store_order() {
        let body = r#"[
            {"id":"b","text":"second","completed":false,"created_at":"later"},
            {"id":"a","text":"first","completed":false,"created_at":"earlier"}
        ]"#;
        let tasks = client().parse_list_tasks(response(200, body)).unwrap();
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[test]
    fn parse_list_tasks_bad_json() {
        let err = client().parse_list_tasks(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_list_tasks_error_status() {
        let err = client()
            .parse_list_tasks(response(401, r#"{"message":"Invalid API key"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
    }

    #[test]
    fn mutations_accept_any_success_status() {
        let c = client();
        assert!(c.parse_create_task(response(201, "")).is_ok());
        assert!(c.parse_set_completed(response(204, "")).is_ok());
        assert!(c.parse_set_completed(response(200, "[]")).is_ok());
        assert!(c.parse_delete_task(response(204, "")).is_ok());
    }

    #[test]
    fn parse_create_task_rejection() {
        let err = client()
            .parse_create_task(response(400, "check constraint violated"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 400, .. }));
    }
}

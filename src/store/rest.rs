//! Hosted table backend speaking the PostgREST dialect.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{RecordBackend, StoreError};
use crate::domain::record::Record;

pub const DEFAULT_TABLE: &str = "study-record";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    title: &'a str,
    time: f64,
}

pub struct RestBackend {
    client: Client,
    table_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(config: &RestConfig) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            table_url: table_url(&config.base_url, &config.table),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn single_row(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.request(method)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", RETURN_REPRESENTATION)
    }
}

pub fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl RecordBackend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        debug!(url = %self.table_url, "listing records");
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*")])
            .send()
            .await?;
        decode(response).await
    }

    async fn insert(&self, title: &str, time: f64) -> Result<Record, StoreError> {
        debug!(url = %self.table_url, title, time, "inserting record");
        let response = self
            .single_row(reqwest::Method::POST)
            .json(&RecordPayload { title, time })
            .send()
            .await?;
        decode(response).await
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Result<Record, StoreError> {
        debug!(url = %self.table_url, id, title, time, "updating record");
        let response = self
            .single_row(reqwest::Method::PATCH)
            .query(&id_filter(id))
            .json(&RecordPayload { title, time })
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        debug!(url = %self.table_url, id, "deleting record");
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&id_filter(id))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{table_url, RestBackend, RestConfig, DEFAULT_TABLE};
    use crate::domain::record::Record;
    use crate::store::{RecordBackend, StoreError};

    const TABLE_PATH: &str = "/rest/v1/study-record";

    fn backend_for(server: &MockServer) -> RestBackend {
        RestBackend::new(&RestConfig {
            base_url: server.uri(),
            api_key: "anon-key".to_string(),
            table: DEFAULT_TABLE.to_string(),
            timeout: None,
        })
        .expect("backend should build")
    }

    #[test]
    fn table_url_joins_without_double_slash() {
        assert_eq!(
            table_url("https://db.example.com/", "study-record"),
            "https://db.example.com/rest/v1/study-record"
        );
        assert_eq!(
            table_url("http://localhost:54321", "notes"),
            "http://localhost:54321/rest/v1/notes"
        );
    }

    #[tokio::test]
    async fn list_all_selects_every_row_with_api_key_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", "*"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "React", "time": 2, "created_at": "2026-01-01T00:00:00Z"},
                {"id": 2, "title": "TypeScript", "time": 3.5}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = backend_for(&server)
            .list_all()
            .await
            .expect("list should succeed");
        assert_eq!(
            records,
            vec![
                Record::new("1", "React", 2.0),
                Record::new("2", "TypeScript", 3.5)
            ]
        );
    }

    #[tokio::test]
    async fn insert_posts_payload_and_decodes_single_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(header("accept", "application/vnd.pgrst.object+json"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"title": "Rust", "time": 2.0})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": "abc", "title": "Rust", "time": 2})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let record = backend_for(&server)
            .insert("Rust", 2.0)
            .await
            .expect("insert should succeed");
        assert_eq!(record, Record::new("abc", "Rust", 2.0));
    }

    #[tokio::test]
    async fn update_filters_by_id_and_returns_authoritative_row() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.7"))
            .and(body_json(json!({"title": "  Go ", "time": 1.0})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 7, "title": "Go", "time": 1})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let record = backend_for(&server)
            .update("7", "  Go ", 1.0)
            .await
            .expect("update should succeed");
        assert_eq!(record, Record::new("7", "Go", 1.0));
    }

    #[tokio::test]
    async fn delete_succeeds_on_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        backend_for(&server)
            .delete("3")
            .await
            .expect("delete should succeed");
    }

    #[tokio::test]
    async fn error_statuses_carry_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .delete("3")
            .await
            .expect_err("unauthorized delete should fail");
        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_rows_are_decode_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .list_all()
            .await
            .expect_err("object body should not decode as a listing");
        assert!(matches!(err, StoreError::Decode(_)));
    }
}

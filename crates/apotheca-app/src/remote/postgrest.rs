//! PostgREST table source
//!
//! Implementation of `TableSource` for the hosted backend's REST API
//! (`/rest/v1/<table>`).

use crate::config::RemoteConfig;
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::query::Query;
use super::traits::TableSource;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Media type asking for a single object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Remote tables over HTTP
pub struct PostgrestSource {
    client: HttpClient,
    config: RemoteConfig,
}

impl PostgrestSource {
    /// Create a source for the configured backend
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.api_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api_key))?,
        );

        Ok(Self {
            client: HttpClient::with_headers(headers)?,
            config,
        })
    }

    /// The backend this source talks to
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::Config("API key contains characters not allowed in headers".to_string()))
}

/// Total row count from a `Content-Range` header (`0-24/3573`, `*/0`)
fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.rsplit_once('/')?;
    total.trim().parse().ok()
}

impl TableSource for PostgrestSource {
    fn id(&self) -> &'static str {
        "postgrest"
    }

    fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let url = self.config.table_url(&query.table);
        let request = self
            .client
            .request(Method::GET, &url)
            .query(&query.to_params());
        Ok(self.client.send(request)?.json()?)
    }

    fn count(&self, query: &Query) -> Result<u64> {
        let url = self.config.table_url(&query.table);
        let request = self
            .client
            .request(Method::HEAD, &url)
            .query(&query.to_params())
            .header("Prefer", "count=exact");
        let resp = self.client.send(request)?;

        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| AppError::Remote {
                status: resp.status().as_u16(),
                message: format!("missing row count for {query}"),
            })
    }

    fn select_single(&self, query: &Query) -> Result<Value> {
        let url = self.config.table_url(&query.table);
        let request = self
            .client
            .request(Method::GET, &url)
            .query(&query.to_params())
            .header(ACCEPT, SINGLE_OBJECT);

        match self.client.send(request) {
            Ok(resp) => Ok(resp.json()?),
            // The backend answers 406 when zero or several rows match
            Err(AppError::Remote { status, message })
                if status == StatusCode::NOT_ACCEPTABLE.as_u16() =>
            {
                Err(AppError::NotFound(format!("{query}: {message}")))
            }
            Err(e) => Err(e),
        }
    }

    fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let url = self.config.table_url(table);
        let request = self
            .client
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&row);
        let rows: Vec<Value> = self.client.send(request)?.json()?;

        rows.into_iter().next().ok_or_else(|| AppError::InvalidRow {
            table: table.to_string(),
            reason: "insert returned no row".to_string(),
        })
    }

    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let url = self.config.table_url(&query.table);
        let request = self
            .client
            .request(Method::PATCH, &url)
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        Ok(self.client.send(request)?.json()?)
    }
}

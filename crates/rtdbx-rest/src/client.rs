//! `RtdbClient` over the Firebase REST API

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rtdbx_core::model::path_segments;
use rtdbx_core::{OrderBy, QueryOptions, Result, RtdbClient};
use rtdbx_core_types::Sensitive;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::error::RestError;

/// Per-request timeout unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one database
#[derive(Debug, Clone)]
pub struct RestClient {
    base: Url,
    auth: Option<Sensitive<String>>,
    http: reqwest::Client,
}

impl RestClient {
    /// Connect to the database at `database_url`
    ///
    /// Query parameters already on the URL (such as the emulator's `ns`) are
    /// kept on every request.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the URL cannot address paths
    pub fn new(database_url: &str, auth: Option<Sensitive<String>>) -> Result<Self> {
        Self::with_timeout(database_url, auth, DEFAULT_TIMEOUT)
    }

    /// Like [`new`](Self::new) with an explicit per-request timeout
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the URL cannot address paths
    /// - `ExternalService` if the HTTP client cannot be built
    pub fn with_timeout(
        database_url: &str,
        auth: Option<Sensitive<String>>,
        timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(database_url).map_err(|source| RestError::InvalidUrl {
            url: database_url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(RestError::OpaqueUrl(database_url.to_string()).into());
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RestError::from)?;
        Ok(Self { base, auth, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/{path}.json` with the auth token and `params` appended
    fn url_for(&self, path: &str, params: &[(&str, String)]) -> std::result::Result<Url, RestError> {
        let mut url = self.base.clone();
        let segments: Vec<&str> = path_segments(path).collect();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| RestError::OpaqueUrl(self.base.to_string()))?;
            parts.pop_if_empty();
            match segments.split_last() {
                Some((last, init)) => {
                    parts.extend(init);
                    parts.push(&format!("{}.json", last));
                }
                None => {
                    parts.push(".json");
                }
            }
        }
        if self.auth.is_some() || !params.is_empty() {
            let mut query = url.query_pairs_mut();
            if let Some(token) = &self.auth {
                query.append_pair("auth", token.expose());
            }
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> std::result::Result<Option<Value>, RestError> {
        let url = self.url_for(path, params)?;
        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        // reqwest errors embed the URL, which carries the token
        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        tracing::debug!(method = %method, path = %path, status = status.as_u16(), "RTDB request");

        let text = response.text().await.map_err(|e| e.without_url())?;
        if !status.is_success() {
            return Err(RestError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| RestError::Decode(e.to_string()))?;
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

/// Firebase reports failures as `{"error": "..."}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn silent() -> (&'static str, String) {
    ("print", "silent".to_string())
}

/// REST query parameters; every value is JSON-encoded
fn query_params(options: &QueryOptions) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if options.is_empty() {
        return params;
    }

    let order_by = match options.order_by.as_ref().unwrap_or(&OrderBy::Key) {
        OrderBy::Key => "$key".to_string(),
        OrderBy::Value => "$value".to_string(),
        OrderBy::Child(child) => child.clone(),
    };
    params.push(("orderBy", Value::String(order_by).to_string()));

    let bounds = [
        ("startAt", &options.start_at),
        ("endAt", &options.end_at),
        ("equalTo", &options.equal_to),
    ];
    for (name, bound) in bounds {
        if let Some(value) = bound {
            params.push((name, value.to_string()));
        }
    }
    if let Some(n) = options.limit_to_first {
        params.push(("limitToFirst", n.to_string()));
    }
    if let Some(n) = options.limit_to_last {
        params.push(("limitToLast", n.to_string()));
    }
    params
}

#[async_trait]
impl RtdbClient for RestClient {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.send(Method::GET, path, &[], None).await?)
    }

    async fn get_shallow(&self, path: &str) -> Result<Option<Value>> {
        let params = [("shallow", "true".to_string())];
        Ok(self.send(Method::GET, path, &params, None).await?)
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.send(Method::PUT, path, &[silent()], Some(&value))
            .await?;
        Ok(())
    }

    async fn merge(&self, path: &str, partial: Map<String, Value>) -> Result<()> {
        let body = Value::Object(partial);
        self.send(Method::PATCH, path, &[silent()], Some(&body))
            .await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, &[silent()], None).await?;
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let response = self.send(Method::POST, path, &[], Some(&value)).await?;
        let key = response
            .as_ref()
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| RestError::Decode("push response without a name".to_string()))?;
        Ok(key.to_string())
    }

    async fn query(&self, path: &str, options: &QueryOptions) -> Result<Option<Value>> {
        let params = query_params(options);
        Ok(self.send(Method::GET, path, &params, None).await?)
    }
}

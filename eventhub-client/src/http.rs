use std::sync::Arc;

use eventhub_core::SessionStore;
use reqwest::{header, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ClientError, ClientResult};

/// JSON-over-HTTP plumbing shared by the service clients.
///
/// Attaches `Authorization: Bearer <token>` whenever the session holds a token and
/// turns non-2xx answers into [`ClientError::Api`] carrying the server's `message`.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub async fn get(&self, endpoint: &str) -> ClientResult<Value> {
        self.call::<()>(Method::GET, endpoint, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ClientResult<Value> {
        self.call(Method::POST, endpoint, Some(body)).await
    }

    pub async fn post_empty(&self, endpoint: &str) -> ClientResult<Value> {
        self.call::<()>(Method::POST, endpoint, None).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ClientResult<Value> {
        self.call(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<Value> {
        self.call::<()>(Method::DELETE, endpoint, None).await
    }

    /// One request, no retry.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ClientResult<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!("Making API call: {} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(|e| {
            error!("API call to {} failed: {}", url, e);
            ClientError::Network(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        debug!("API response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            error!("API call to {} failed: {}", url, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// `body.data` when present and non-null, otherwise the body itself.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !is_falsy(&data) => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// `body.data`, or `None` when missing or null.
pub fn data_field(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove("data").filter(|d| !is_falsy(d)),
        _ => None,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

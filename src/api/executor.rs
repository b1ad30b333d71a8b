use std::time::Duration;

use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// A single call to the task service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    token: Option<String>,
    headers: HeaderMap,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            token: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Parsed success body of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub data: Value,
    pub meta: Option<Value>,
}

/// Performs requests and folds every failure into [`ApiError`].
///
/// Holds no per-user state; the bearer token travels with each request.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http_client: reqwest::Client,
}

impl RequestExecutor {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {}", e), None))?;

        Ok(Self { http_client })
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let method = request.method.clone();
        let url = request.url.clone();

        match self.send(request).await {
            Ok(response) => {
                debug!("{} {} -> {}", method, url, response.status);
                Ok(response)
            }
            Err(e) => {
                error!(
                    "API error [{} {}]: {} (status {:?})",
                    method,
                    url,
                    e,
                    e.status()
                );
                Err(e)
            }
        }
    }

    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(token) = request.token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let parsed = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            let body = parsed.unwrap_or_else(|_| Value::Object(Default::default()));
            return Err(ApiError::from_status(status, error_message(&body, status)));
        }

        let body = parsed.map_err(|e| {
            ApiError::network(
                format!("Failed to parse response body: {}", e),
                Some(status.as_u16()),
            )
        })?;

        Ok(ApiResponse {
            status,
            data: body.get("data").cloned().unwrap_or(Value::Null),
            meta: body.get("meta").filter(|m| !m.is_null()).cloned(),
        })
    }
}

fn error_message(body: &Value, status: StatusCode) -> String {
    match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => format!("HTTP {}", status.as_u16()),
    }
}

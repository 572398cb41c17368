//! Single-request HTTP layer shared by every Daemo call.
//!
//! `Transport` sends one request, checks the status and decodes the JSON
//! body. It holds no auth state: callers pass the headers for each call.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{DaemoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP transport for the Daemo API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Create a transport; `timeout` bounds each whole request when set.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// DELETE never yields a body (`Ok(None)`); GET and POST always do, and a
    /// missing or malformed body on a successful response is a protocol error.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&B>,
        headers: &HeaderMap,
    ) -> Result<Option<Value>> {
        debug!(method = %method, url = url, has_body = body.is_some(), "Sending request");

        let mut builder = self
            .client
            .request(method.to_reqwest(), url)
            .headers(headers.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method = %method, url = url, status = status.as_u16(), "Request failed");
            return Err(DaemoError::from_status(status, method, url, &body));
        }

        if method == HttpMethod::Delete {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DaemoError::protocol(url, "expected a JSON body, got an empty response"));
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| DaemoError::protocol(url, format!("malformed JSON body: {}", e)))?;
        Ok(Some(value))
    }

    pub async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value> {
        let value = self
            .request::<Value>(HttpMethod::Get, url, None, headers)
            .await?;
        Self::require_body(url, value)
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> Result<Value> {
        let value = self
            .request(HttpMethod::Post, url, Some(body), headers)
            .await?;
        Self::require_body(url, value)
    }

    /// POST without a payload, for actions such as publish or approve.
    pub async fn post_action(&self, url: &str, headers: &HeaderMap) -> Result<Value> {
        let value = self
            .request::<Value>(HttpMethod::Post, url, None, headers)
            .await?;
        Self::require_body(url, value)
    }

    pub async fn delete(&self, url: &str, headers: &HeaderMap) -> Result<()> {
        self.request::<Value>(HttpMethod::Delete, url, None, headers)
            .await?;
        Ok(())
    }

    fn require_body(url: &str, value: Option<Value>) -> Result<Value> {
        value.ok_or_else(|| DaemoError::protocol(url, "expected a JSON body"))
    }
}

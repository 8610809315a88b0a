//! HTTP request descriptors and the transport that executes them.
//!
//! Nodes never talk to the network directly: they build an
//! [`HttpRequestDescriptor`] and hand it to an [`HttpTransport`]. The
//! production transport is [`ReqwestTransport`]; tests use
//! [`MockTransport`](crate::mock::MockTransport).

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::TransportError;

/// Header carrying the caller's API key. Redacted from `Debug` output.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    FormUrlEncoded,
}

impl BodyEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

/// Request payload, already in its wire representation for form bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// `key=value&...`, percent-encoded.
    Form(String),
}

impl RequestBody {
    pub fn encoding(&self) -> BodyEncoding {
        match self {
            Self::Json(_) => BodyEncoding::Json,
            Self::Form(_) => BodyEncoding::FormUrlEncoded,
        }
    }
}

/// Everything a transport needs to perform one HTTP exchange.
#[derive(Clone, PartialEq)]
pub struct HttpRequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Empty when the request has no query string. Sent in insertion order.
    pub query: IndexMap<String, String>,
    pub body: Option<RequestBody>,
}

impl HttpRequestDescriptor {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encoding of the body, if there is one.
    pub fn body_encoding(&self) -> Option<BodyEncoding> {
        self.body.as_ref().map(RequestBody::encoding)
    }
}

impl fmt::Debug for HttpRequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(API_KEY_HEADER) {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .finish()
    }
}

/// The generic HTTP-call capability a node relies on.
///
/// Returns the response body on 2xx; anything else is a [`TransportError`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn call(&self, request: &HttpRequestDescriptor) -> Result<Value, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn call(&self, request: &HttpRequestDescriptor) -> Result<Value, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(encoded)) => builder.body(encoded.clone()),
            None => builder,
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        if !status.is_success() {
            let detail = (!text.is_empty()).then(|| parse_body(&text));
            return Err(TransportError::status(status.as_u16(), detail));
        }

        Ok(parse_body(&text))
    }
}

/// JSON when the body parses as JSON, the raw text otherwise, `null` when
/// empty.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

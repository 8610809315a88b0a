//! `MockTransport`: a test double for `HttpTransport`.
//!
//! Useful in unit and integration tests where a real HTTP server is either
//! unavailable or irrelevant.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::http::{HttpRequestDescriptor, HttpTransport};
use crate::TransportError;

/// Behaviour for one call, consumed in order.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Answer 2xx with this body.
    Body(Value),
    /// Fail as if the server answered `status` with an optional body.
    Status(u16, Option<Value>),
    /// Fail before any response was received.
    Network(String),
}

/// A mock transport that records every request it receives and replies from
/// a script. Once the script is exhausted it keeps repeating `fallback`.
pub struct MockTransport {
    script: Mutex<VecDeque<MockResponse>>,
    fallback: MockResponse,
    /// All requests seen by this transport (in call order).
    pub calls: Arc<Mutex<Vec<HttpRequestDescriptor>>>,
}

impl MockTransport {
    /// A transport that always succeeds with `body`.
    pub fn returning(body: Value) -> Self {
        Self::scripted(Vec::new(), MockResponse::Body(body))
    }

    /// A transport that replies with `script` in order, then with `fallback`.
    pub fn scripted(script: Vec<MockResponse>, fallback: MockResponse) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of requests sent through this transport.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Copy of the `n`-th request (0-based).
    pub fn request(&self, n: usize) -> Option<HttpRequestDescriptor> {
        self.calls.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn call(&self, request: &HttpRequestDescriptor) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(request.clone());

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match next {
            MockResponse::Body(v) => Ok(v),
            MockResponse::Status(status, detail) => Err(TransportError::status(status, detail)),
            MockResponse::Network(msg) => Err(TransportError::network(msg)),
        }
    }
}

//! Tidi scheduling API node.
//!
//! Each item selects one of five operations. The node turns the item's
//! parameters into an HTTP request, sends it through the configured
//! transport, and returns the API's response body untouched.

pub mod credentials;
pub mod description;
pub mod params;
pub mod request;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::http::{HttpTransport, ReqwestTransport};
use crate::record::Metadata;
use crate::traits::{ExecutionContext, ItemContext};
use crate::{ExecutableNode, NodeError, ResultRecord};

pub use credentials::{TidiApiCredentials, CREDENTIAL_NAME};
pub use params::{Language, Operation, OperationKind, OperationRequest, TidiParameters};
pub use request::DEFAULT_BASE_URL;

pub const NODE_NAME: &str = "tidiNode";

/// Connection settings for the Tidi API.
#[derive(Debug, Clone)]
pub struct TidiConfig {
    /// Origin the endpoint paths are appended to.
    pub base_url: String,
    /// Per-request timeout of the default transport.
    pub timeout: Duration,
}

impl Default for TidiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct TidiNode {
    transport: Arc<dyn HttpTransport>,
    config: TidiConfig,
}

impl TidiNode {
    /// Node using a reqwest transport built from `config`.
    pub fn new(config: TidiConfig) -> Result<Self, NodeError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: TidiConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &TidiConfig {
        &self.config
    }

    pub fn description() -> description::NodeDescription {
        description::node_description()
    }
}

/// Turn the outcome of an item's HTTP call into its result record.
pub fn normalize(
    kind: OperationKind,
    language: Language,
    outcome: Result<Value, NodeError>,
    paired_item: usize,
) -> ResultRecord {
    let metadata = Metadata::now(
        Some(request::endpoint(kind, language)),
        Some(request::method(kind)),
    );
    match outcome {
        Ok(data) => ResultRecord::succeeded(kind.as_str(), data, metadata, paired_item),
        Err(err) => ResultRecord::failed(kind.as_str(), &err, metadata, paired_item),
    }
}

#[async_trait]
impl ExecutableNode for TidiNode {
    fn name(&self) -> &str {
        NODE_NAME
    }

    async fn execute(
        &self,
        item: &ItemContext,
        ctx: &ExecutionContext,
    ) -> Result<ResultRecord, NodeError> {
        let params: TidiParameters = item.resolve()?;
        let creds: TidiApiCredentials = ctx.credentials(CREDENTIAL_NAME, item.index)?;
        let request = params.into_request(creds.api_key)?;
        let kind = request.operation.kind();

        let descriptor = request::build(&request, &self.config.base_url);
        debug!(
            item = item.index,
            method = %descriptor.method,
            url = %descriptor.url,
            "sending Tidi request"
        );

        let data = self.transport.call(&descriptor).await?;
        Ok(normalize(kind, request.language, Ok(data), item.index))
    }

    /// Keeps the endpoint in the record when the item's operation was valid.
    fn failure_record(&self, item: &ItemContext, err: &NodeError) -> ResultRecord {
        let target = item
            .resolve::<TidiParameters>()
            .and_then(|p| p.target());
        match target {
            Ok((kind, language)) => normalize(kind, language, Err(err.clone()), item.index),
            Err(_) => {
                let operation = item
                    .parameter::<String>("operation", "unknown".into())
                    .unwrap_or_else(|_| "unknown".into());
                ResultRecord::failed(operation, err, Metadata::now(None, None), item.index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, RequestBody};
    use crate::mock::{MockResponse, MockTransport};
    use crate::TransportError;
    use serde_json::json;

    fn ctx() -> ExecutionContext {
        ExecutionContext::default().with_credentials(CREDENTIAL_NAME, json!({ "apiKey": "k-1" }))
    }

    fn item(index: usize, v: Value) -> ItemContext {
        match v {
            Value::Object(map) => ItemContext::new(index, map),
            _ => unreachable!(),
        }
    }

    fn node(transport: Arc<MockTransport>) -> TidiNode {
        TidiNode::with_transport(transport, TidiConfig::default())
    }

    #[tokio::test]
    async fn response_body_is_passed_through() {
        let body = json!({ "services": [{ "id": "s1", "name": "Corte" }] });
        let transport = Arc::new(MockTransport::returning(body.clone()));
        let node = node(transport.clone());

        let record = node
            .execute(
                &item(
                    4,
                    json!({
                        "operation": "getServices",
                        "language": "en",
                        "additionalFilters": { "filters": [{ "key": "active", "value": "1" }] }
                    }),
                ),
                &ctx(),
            )
            .await
            .unwrap();

        assert!(record.success);
        assert_eq!(record.operation, "getServices");
        assert_eq!(record.data(), Some(&body));
        assert_eq!(record.paired_item, 4);
        assert_eq!(
            record.metadata.endpoint.as_deref(),
            Some("/en/integration/partner/services")
        );
        assert_eq!(record.metadata.method, Some(HttpMethod::Get));

        let sent = transport.request(0).unwrap();
        assert_eq!(sent.url, "https://api.tidi.com.br/en/integration/partner/services");
        assert_eq!(sent.query.get("active").map(String::as_str), Some("1"));
        assert_eq!(sent.header("x-api-key"), Some("k-1"));
    }

    #[tokio::test]
    async fn schedule_sends_form_body() {
        let transport = Arc::new(MockTransport::returning(json!({ "ok": true })));
        let node = node(transport.clone());

        node.execute(
            &item(
                0,
                json!({
                    "operation": "schedule",
                    "day": "2025-08-22",
                    "hour": "10:00",
                    "professionalId": "p1",
                    "services": "[\"s1\"]",
                    "name": "Ana",
                    "email": "a@x.com",
                    "phone": "31999999999"
                }),
            ),
            &ctx(),
        )
        .await
        .unwrap();

        let sent = transport.request(0).unwrap();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(
            sent.body,
            Some(RequestBody::Form(
                "day=2025-08-22&hour=10%3A00&professional=p1&services=%5B%22s1%22%5D\
                 &name=Ana&email=a%40x.com&phone=31999999999"
                    .into()
            ))
        );
    }

    #[tokio::test]
    async fn transport_failure_is_returned_as_error() {
        let transport = Arc::new(MockTransport::scripted(
            vec![MockResponse::Status(404, Some(json!({ "message": "not found" })))],
            MockResponse::Body(json!({})),
        ));
        let node = node(transport.clone());

        let err = node
            .execute(&item(0, json!({ "operation": "getPartner" })), &ctx())
            .await
            .unwrap_err();

        assert_eq!(
            err.remote_detail(),
            Some(&json!({ "message": "not found" }))
        );
        assert!(matches!(
            err,
            NodeError::Transport(TransportError { status: Some(404), .. })
        ));
    }

    #[tokio::test]
    async fn unknown_operation_never_reaches_the_transport() {
        let transport = Arc::new(MockTransport::returning(json!({})));
        let node = node(transport.clone());

        let err = node
            .execute(&item(0, json!({ "operation": "refund" })), &ctx())
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Configuration(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let node = node(Arc::new(MockTransport::returning(json!({}))));
        let err = node
            .execute(&item(0, json!({})), &ExecutionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Configuration(ref m) if m.contains("tidiApi")));
    }

    #[tokio::test]
    async fn numeric_api_key_is_sent_as_text() {
        let transport = Arc::new(MockTransport::returning(json!({})));
        let node = node(transport.clone());
        let ctx = ExecutionContext::default()
            .with_credentials(CREDENTIAL_NAME, json!({ "apiKey": 987654321 }));

        let record = node
            .execute(&item(0, json!({ "operation": "getPartner" })), &ctx)
            .await
            .unwrap();

        assert!(record.success);
        assert_eq!(transport.request(0).unwrap().header("x-api-key"), Some("987654321"));
    }

    #[tokio::test]
    async fn malformed_api_key_never_appears_in_errors() {
        let transport = Arc::new(MockTransport::returning(json!({})));
        let node = node(transport.clone());
        let ctx = ExecutionContext::default()
            .with_credentials(CREDENTIAL_NAME, json!({ "apiKey": { "value": "987654321" } }));
        let it = item(1, json!({ "operation": "getPartner" }));

        let err = node.execute(&it, &ctx).await.unwrap_err();
        assert!(matches!(err, NodeError::Configuration(_)));
        assert!(!err.to_string().contains("987654321"));
        assert!(!err.describe().contains("987654321"));

        let rec = node.failure_record(&it, &err);
        assert!(!rec.to_json().to_string().contains("987654321"));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn failure_record_keeps_endpoint_for_valid_operations() {
        let node = node(Arc::new(MockTransport::returning(json!({}))));
        let err = NodeError::from(TransportError::network("connection reset"));

        let rec = node.failure_record(
            &item(2, json!({ "operation": "checkAvailability", "language": "pt" })),
            &err,
        );
        assert!(!rec.success);
        assert_eq!(rec.error(), Some("connection reset"));
        assert_eq!(
            rec.metadata.endpoint.as_deref(),
            Some("/pt/integration/partner/schedule/availability")
        );

        let rec = node.failure_record(&item(3, json!({ "operation": "refund" })), &err);
        assert_eq!(rec.operation, "refund");
        assert!(rec.metadata.endpoint.is_none());
        assert_eq!(rec.paired_item, 3);
    }
}

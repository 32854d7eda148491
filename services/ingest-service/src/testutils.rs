use std::sync::Arc;

use async_trait::async_trait;
use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
use aws_smithy_runtime_api::http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
use aws_smithy_types::body::SdkBody;
use tokio::sync::Mutex;

use crate::config::MetricsMode;
use crate::metrics::{MetricsError, MetricsSink};
use crate::models::{MetricSample, Record};
use crate::state::AppState;
use crate::store::{MemoryRecordStore, RecordStore, StoreError};

pub const TEST_FUNCTION_NAME: &str = "DataProcessorLambda";

pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn put_record(&self, _record: &Record) -> Result<(), StoreError> {
        Err(StoreError("ProvisionedThroughputExceededException".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    samples: Arc<Mutex<Vec<MetricSample>>>,
}

impl RecordingSink {
    pub async fn samples(&self) -> Vec<MetricSample> {
        self.samples.lock().await.clone()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn emit(&self, sample: &MetricSample) -> Result<(), MetricsError> {
        self.samples.lock().await.push(sample.clone());
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl MetricsSink for FailingSink {
    async fn emit(&self, _sample: &MetricSample) -> Result<(), MetricsError> {
        Err(MetricsError("AccessDenied".to_string()))
    }
}

pub fn state_with(
    store: Arc<dyn RecordStore>,
    metrics: Arc<dyn MetricsSink>,
    mode: MetricsMode,
) -> AppState {
    AppState::new(store, metrics, TEST_FUNCTION_NAME, mode)
}

/// Memory-backed state plus handles for asserting on what was written.
pub fn memory_state() -> (AppState, MemoryRecordStore, RecordingSink) {
    let store = MemoryRecordStore::new();
    let sink = RecordingSink::default();
    let state = state_with(
        Arc::new(store.clone()),
        Arc::new(sink.clone()),
        MetricsMode::Strict,
    );
    (state, store, sink)
}

/// One canned AWS response; the request side is only recorded, never matched.
pub fn replay(status: u16, content_type: &'static str, body: &'static str) -> StaticReplayClient {
    let mut response = HttpResponse::new(
        StatusCode::try_from(status).expect("valid status"),
        SdkBody::from(body),
    );
    response.headers_mut().insert("content-type", content_type);
    StaticReplayClient::new(vec![ReplayEvent::new(
        HttpRequest::new(SdkBody::empty()),
        response,
    )])
}

/// Body of the single request the client sent, plus its `x-amz-target` header if any.
pub fn sent_request(http: &StaticReplayClient) -> (Option<String>, Vec<u8>) {
    let requests: Vec<_> = http
        .actual_requests()
        .map(|request| {
            (
                request.headers().get("x-amz-target").map(str::to_string),
                request.body().bytes().unwrap_or_default().to_vec(),
            )
        })
        .collect();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.into_iter().next().expect("one request")
}

pub fn dynamodb_client(http: StaticReplayClient) -> aws_sdk_dynamodb::Client {
    use aws_sdk_dynamodb::config::{retry::RetryConfig, BehaviorVersion, Credentials, Region};

    let config = aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .http_client(http)
        .build();
    aws_sdk_dynamodb::Client::from_conf(config)
}

pub fn cloudwatch_client(http: StaticReplayClient) -> aws_sdk_cloudwatch::Client {
    use aws_sdk_cloudwatch::config::{retry::RetryConfig, BehaviorVersion, Credentials, Region};

    let config = aws_sdk_cloudwatch::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .http_client(http)
        .build();
    aws_sdk_cloudwatch::Client::from_conf(config)
}

/// True when `needle` occurs in the raw request body, whatever the wire protocol.
pub fn body_contains(body: &[u8], needle: &str) -> bool {
    body.windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

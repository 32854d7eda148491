use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};

use crate::config::{ConfigError, IngestConfig, MetricsBackend, MetricsMode, StorageBackend};
use crate::metrics::{CloudWatchSink, LogMetricsSink, MetricsSink};
use crate::store::{DynamoRecordStore, MemoryRecordStore, RecordStore};

/// Process-wide handles shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub metrics: Arc<dyn MetricsSink>,
    pub function_name: Arc<str>,
    pub metrics_mode: MetricsMode,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        metrics: Arc<dyn MetricsSink>,
        function_name: &str,
        metrics_mode: MetricsMode,
    ) -> Self {
        Self {
            store,
            metrics,
            function_name: Arc::from(function_name),
            metrics_mode,
        }
    }

    pub async fn from_config(config: &IngestConfig) -> Result<Self, ConfigError> {
        let needs_aws = config.storage_backend == StorageBackend::DynamoDb
            || config.metrics_backend == MetricsBackend::CloudWatch;
        let shared = if needs_aws {
            Some(load_sdk_config(config).await)
        } else {
            None
        };

        let store: Arc<dyn RecordStore> = match (config.storage_backend, shared.as_ref()) {
            (StorageBackend::DynamoDb, Some(shared)) => {
                let table_name = config
                    .table_name
                    .clone()
                    .ok_or_else(|| ConfigError::Missing("TABLE_NAME is required".to_string()))?;
                Arc::new(DynamoRecordStore::new(
                    aws_sdk_dynamodb::Client::new(shared),
                    table_name,
                ))
            }
            _ => Arc::new(MemoryRecordStore::new()),
        };

        let metrics: Arc<dyn MetricsSink> = match (config.metrics_backend, shared.as_ref()) {
            (MetricsBackend::CloudWatch, Some(shared)) => Arc::new(CloudWatchSink::new(
                aws_sdk_cloudwatch::Client::new(shared),
                config.metric_namespace.as_str(),
            )),
            _ => Arc::new(LogMetricsSink),
        };

        tracing::info!(
            storage = ?config.storage_backend,
            metrics = ?config.metrics_backend,
            metrics_mode = ?config.metrics_mode,
            table = config.table_name.as_deref().unwrap_or("-"),
            "ingest state ready"
        );

        Ok(Self::new(
            store,
            metrics,
            config.function_name.as_str(),
            config.metrics_mode,
        ))
    }
}

async fn load_sdk_config(config: &IngestConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    if let Some(endpoint) = config.endpoint_url.as_deref() {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_cloudwatch::{
    error::DisplayErrorContext,
    types::{Dimension, MetricDatum, StandardUnit},
    Client,
};
use thiserror::Error;

use crate::models::{MetricSample, MetricUnit};

pub const PROCESSING_DURATION: &str = "ProcessingDuration";
pub const FUNCTION_NAME_DIMENSION: &str = "FunctionName";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MetricsError(pub String);

#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn emit(&self, sample: &MetricSample) -> Result<(), MetricsError>;
}

/// Build the per-request duration sample tagged with the handler's logical name.
pub fn duration_sample(function_name: &str, elapsed: Duration) -> MetricSample {
    MetricSample {
        name: PROCESSING_DURATION,
        unit: MetricUnit::Milliseconds,
        value: elapsed.as_secs_f64() * 1000.0,
        dimensions: vec![(FUNCTION_NAME_DIMENSION.to_string(), function_name.to_string())],
    }
}

#[derive(Clone)]
pub struct CloudWatchSink {
    client: Client,
    namespace: String,
}

impl CloudWatchSink {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

fn standard_unit(unit: MetricUnit) -> StandardUnit {
    match unit {
        MetricUnit::Milliseconds => StandardUnit::Milliseconds,
    }
}

fn to_datum(sample: &MetricSample) -> MetricDatum {
    let dimensions = sample
        .dimensions
        .iter()
        .map(|(name, value)| {
            Dimension::builder()
                .name(name.as_str())
                .value(value.as_str())
                .build()
        })
        .collect::<Vec<_>>();

    MetricDatum::builder()
        .metric_name(sample.name)
        .set_dimensions(Some(dimensions))
        .unit(standard_unit(sample.unit))
        .value(sample.value)
        .build()
}

#[async_trait]
impl MetricsSink for CloudWatchSink {
    async fn emit(&self, sample: &MetricSample) -> Result<(), MetricsError> {
        let datum = to_datum(sample);
        self.client
            .put_metric_data()
            .namespace(self.namespace.as_str())
            .metric_data(datum)
            .send()
            .await
            .map_err(|err| {
                MetricsError(format!(
                    "put metric data to {} failed: {}",
                    self.namespace,
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(())
    }
}

/// Writes samples to the operational log instead of a metrics backend.
#[derive(Clone, Default)]
pub struct LogMetricsSink;

#[async_trait]
impl MetricsSink for LogMetricsSink {
    async fn emit(&self, sample: &MetricSample) -> Result<(), MetricsError> {
        tracing::info!(
            metric = sample.name,
            unit = sample.unit.as_str(),
            value = sample.value,
            dimensions = ?sample.dimensions,
            "metric sample"
        );
        Ok(())
    }
}

use std::str::FromStr;

use datapipe_common::env_required;
use thiserror::Error;

pub const DEFAULT_METRIC_NAMESPACE: &str = "CustomMetrics";
pub const DEFAULT_FUNCTION_NAME: &str = "DataProcessorLambda";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0}")]
    Missing(String),
    #[error("invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    DynamoDb,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsBackend {
    CloudWatch,
    Log,
}

/// Whether a failed metric emission fails the request after the record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsMode {
    Strict,
    BestEffort,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(StorageBackend::DynamoDb),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

impl FromStr for MetricsBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloudwatch" => Ok(MetricsBackend::CloudWatch),
            "log" => Ok(MetricsBackend::Log),
            _ => Err(()),
        }
    }
}

impl FromStr for MetricsMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(MetricsMode::Strict),
            "best_effort" => Ok(MetricsMode::BestEffort),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// Only `None` for the memory backend.
    pub table_name: Option<String>,
    pub metrics_backend: MetricsBackend,
    pub metric_namespace: String,
    pub function_name: String,
    pub metrics_mode: MetricsMode,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::DynamoDb)?;
        let table_name = match storage_backend {
            StorageBackend::DynamoDb => Some(
                non_empty(&lookup, "TABLE_NAME")
                    .ok_or_else(|| ConfigError::Missing("TABLE_NAME is required".to_string()))?,
            ),
            StorageBackend::Memory => non_empty(&lookup, "TABLE_NAME"),
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 8080u16)?,
            storage_backend,
            table_name,
            metrics_backend: parse_or(&lookup, "METRICS_BACKEND", MetricsBackend::CloudWatch)?,
            metric_namespace: non_empty(&lookup, "METRIC_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_METRIC_NAMESPACE.to_string()),
            function_name: non_empty(&lookup, "FUNCTION_NAME")
                .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string()),
            metrics_mode: parse_or(&lookup, "METRICS_MODE", MetricsMode::Strict)?,
            endpoint_url: non_empty(&lookup, "AWS_ENDPOINT_URL"),
            region: non_empty(&lookup, "AWS_REGION"),
        })
    }
}

/// Lambda sets this for every function; its presence selects the Lambda runtime adapter.
pub fn running_in_lambda() -> bool {
    env_required("AWS_LAMBDA_RUNTIME_API").is_ok()
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, key) {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

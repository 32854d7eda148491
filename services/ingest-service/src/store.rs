use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::Record;

const ATTR_ID: &str = "id";
const ATTR_CONTENT: &str = "content";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Write-only view of the table holding ingested records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_record(&self, record: &Record) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put_record(&self, record: &Record) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(self.table_name.as_str())
            .item(ATTR_ID, AttributeValue::S(record.id.clone()))
            .item(ATTR_CONTENT, AttributeValue::S(record.content.clone()))
            .send()
            .await
            .map_err(|err| {
                StoreError(format!(
                    "put item into {} failed: {}",
                    self.table_name,
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(())
    }
}

/// Process-local table for running without AWS.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, id: &str) -> Option<String> {
        self.records.lock().await.get(id).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put_record(&self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.insert(record.id.clone(), record.content.clone());
        tracing::debug!(id = %record.id, stored = records.len(), "record kept in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{dynamodb_client, replay, sent_request};

    #[tokio::test]
    async fn memory_store_keeps_content_verbatim() {
        let store = MemoryRecordStore::new();
        let record = Record {
            id: "a".to_string(),
            content: "  line one\nline two\u{1F600}".to_string(),
        };
        store.put_record(&record).await.unwrap();
        assert_eq!(store.get("a").await.as_deref(), Some(record.content.as_str()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn memory_store_clones_share_records() {
        let store = MemoryRecordStore::new();
        let handle = store.clone();
        handle
            .put_record(&Record {
                id: "b".to_string(),
                content: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(store.get("b").await.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn dynamodb_put_item_sends_id_and_content_strings() {
        let http = replay(200, "application/x-amz-json-1.0", "{}");
        let store = DynamoRecordStore::new(dynamodb_client(http.clone()), "DataTable");
        let record = Record {
            id: "0d1c1a2e-6f0b-4c7e-9a51-3b8f1f2d4c11".to_string(),
            content: "hello world".to_string(),
        };

        store.put_record(&record).await.unwrap();

        let (target, body) = sent_request(&http);
        assert_eq!(target.as_deref(), Some("DynamoDB_20120810.PutItem"));
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "TableName": "DataTable",
                "Item": {
                    "id": { "S": "0d1c1a2e-6f0b-4c7e-9a51-3b8f1f2d4c11" },
                    "content": { "S": "hello world" }
                }
            })
        );
    }

    #[tokio::test]
    async fn dynamodb_error_becomes_store_error() {
        let http = replay(
            400,
            "application/x-amz-json-1.0",
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
        );
        let store = DynamoRecordStore::new(dynamodb_client(http), "MissingTable");

        let err = store
            .put_record(&Record {
                id: "x".to_string(),
                content: "y".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.0.starts_with("put item into MissingTable failed"), "{err}");
    }
}

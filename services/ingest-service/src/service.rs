use std::time::Instant;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::MetricsMode;
use crate::error::IngestError;
use crate::metrics::duration_sample;
use crate::models::{IngestRequest, IngestResponse, Record, SUCCESS_MESSAGE};
use crate::state::AppState;

/// Parse, persist, then report how long the persist path took.
///
/// The metric is emitted only after the record is written, and never on failure.
pub async fn ingest(state: &AppState, body: &[u8]) -> Result<IngestResponse, IngestError> {
    let started = Instant::now();

    // Decoding as a map first keeps serde's sequence form (`["..."]`) out.
    let fields: Map<String, Value> = serde_json::from_slice(body)?;
    let request: IngestRequest = serde_json::from_value(Value::Object(fields))?;
    let content = request.file_content.ok_or(IngestError::MissingContent)?;

    let record = Record {
        id: Uuid::new_v4().to_string(),
        content,
    };
    state.store.put_record(&record).await?;

    let sample = duration_sample(&state.function_name, started.elapsed());
    if let Err(err) = state.metrics.emit(&sample).await {
        match state.metrics_mode {
            MetricsMode::Strict => return Err(err.into()),
            MetricsMode::BestEffort => {
                tracing::warn!(id = %record.id, error = %err, "metric emission failed");
            }
        }
    }

    tracing::info!(
        id = %record.id,
        duration_ms = sample.value,
        "item successfully written to table"
    );

    Ok(IngestResponse {
        message: SUCCESS_MESSAGE,
        id: record.id,
    })
}

use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "File processed successfully";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const NOT_FOUND_MESSAGE: &str = "Not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

#[derive(Deserialize)]
pub struct IngestRequest {
    #[serde(rename = "fileContent")]
    pub file_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
    pub id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: &'static str,
}

impl ErrorResponse {
    pub fn internal() -> Self {
        Self {
            message: INTERNAL_ERROR_MESSAGE,
        }
    }

    pub fn not_found() -> Self {
        Self {
            message: NOT_FOUND_MESSAGE,
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            message: METHOD_NOT_ALLOWED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Milliseconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Milliseconds => "Milliseconds",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: &'static str,
    pub unit: MetricUnit,
    pub value: f64,
    pub dimensions: Vec<(String, String)>,
}

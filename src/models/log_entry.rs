use crate::models::error::{LogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded LLM invocation attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub prompt: String,
    pub response: Option<Value>,
    pub error: Option<String>,
    pub duration_ms: f64,
    pub metadata: Value,
    pub locked: bool,
    pub tag: Option<String>,
}

/// Result of an invocation, ready to be appended to the store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewLogEntry {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    #[serde(default)]
    pub tag: Option<String>,
    /// Creation instant; the store stamps `Utc::now()` when absent.
    /// Only set internally (legacy import), never taken from request bodies.
    #[serde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

impl NewLogEntry {
    /// Successful call with a text or structured payload
    pub fn success(model: &str, prompt: &str, response: Value, duration_ms: f64) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: Some(response),
            error: None,
            duration_ms,
            metadata: empty_metadata(),
            tag: None,
            timestamp: None,
        }
    }

    /// Failed call
    pub fn failure(model: &str, prompt: &str, error: &str, duration_ms: f64) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: None,
            error: Some(error.to_string()),
            duration_ms,
            metadata: empty_metadata(),
            tag: None,
            timestamp: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Exactly one of response/error must be populated. Blank tags are dropped.
    pub fn validate(mut self) -> Result<Self> {
        let has_response = matches!(self.response, Some(ref v) if !v.is_null());
        let has_error = self.error.as_deref().is_some_and(|e| !e.trim().is_empty());

        match (has_response, has_error) {
            (true, true) => {
                return Err(LogError::InvalidRequest(
                    "A log entry cannot carry both a response and an error".to_string(),
                ))
            }
            (false, false) => {
                return Err(LogError::InvalidRequest(
                    "A log entry needs either a response or an error".to_string(),
                ))
            }
            _ => {}
        }

        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(LogError::InvalidRequest(format!(
                "duration_ms must be a non-negative number, got {}",
                self.duration_ms
            )));
        }

        if !self.metadata.is_object() {
            return Err(LogError::InvalidRequest(
                "metadata must be a JSON object".to_string(),
            ));
        }

        if !has_response {
            self.response = None;
        }
        if !has_error {
            self.error = None;
        }
        self.tag = self
            .tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(self)
    }
}

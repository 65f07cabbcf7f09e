//! Telemetry Module
//!
//! Structured invocation events for the term handlers, emitted through
//! `tracing`. Each handler invocation produces a started event, a query-built
//! event, and then exactly one completed or failed event.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Telemetry event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryEventType {
    /// Handler invocation started
    InvocationStarted,
    /// Query string built from the filter parameters
    QueryBuilt,
    /// Handler invocation completed successfully
    InvocationCompleted,
    /// Handler invocation failed
    InvocationFailed,
}

/// Telemetry event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event ID
    pub event_id: Uuid,

    /// Event type
    pub event_type: TelemetryEventType,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Handler ID
    pub handler_id: String,

    /// Request ID (for correlation)
    pub request_id: Uuid,

    /// Event payload
    pub payload: serde_json::Value,

    /// Duration in milliseconds (for completed/failed events)
    pub duration_ms: Option<u64>,
}

/// Telemetry emitter.
#[derive(Debug, Clone)]
pub struct TelemetryEmitter {
    handler_id: String,

    /// Whether to dump full events as JSON at debug level
    emit_json: bool,
}

impl TelemetryEmitter {
    /// Create a new telemetry emitter for a handler.
    ///
    /// JSON dumps are on unless `TELEMETRY_STDOUT` is set to something other
    /// than `true` or `1`.
    pub fn new(handler_id: impl Into<String>) -> Self {
        let emit_json = std::env::var("TELEMETRY_STDOUT")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Self::with_config(handler_id, emit_json)
    }

    /// Create emitter with custom configuration.
    pub fn with_config(handler_id: impl Into<String>, emit_json: bool) -> Self {
        Self {
            handler_id: handler_id.into(),
            emit_json,
        }
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    pub fn emit_started(&self, request_id: Uuid, param_count: usize) {
        self.emit(self.event(
            TelemetryEventType::InvocationStarted,
            request_id,
            serde_json::json!({ "param_count": param_count }),
            None,
        ));
    }

    pub fn emit_query_built(&self, request_id: Uuid, soql: &str) {
        self.emit(self.event(
            TelemetryEventType::QueryBuilt,
            request_id,
            serde_json::json!({ "soql": soql }),
            None,
        ));
    }

    pub fn emit_completed(&self, request_id: Uuid, record_count: usize, elapsed: Duration) {
        self.emit(self.event(
            TelemetryEventType::InvocationCompleted,
            request_id,
            serde_json::json!({ "record_count": record_count }),
            Some(elapsed),
        ));
    }

    pub fn emit_failure(&self, request_id: Uuid, error_message: &str, elapsed: Duration) {
        self.emit(self.event(
            TelemetryEventType::InvocationFailed,
            request_id,
            serde_json::json!({ "error": error_message }),
            Some(elapsed),
        ));
    }

    fn event(
        &self,
        event_type: TelemetryEventType,
        request_id: Uuid,
        payload: serde_json::Value,
        elapsed: Option<Duration>,
    ) -> TelemetryEvent {
        TelemetryEvent {
            event_id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            handler_id: self.handler_id.clone(),
            request_id,
            payload,
            duration_ms: elapsed.map(|d| d.as_millis() as u64),
        }
    }

    fn emit(&self, event: TelemetryEvent) {
        match event.event_type {
            TelemetryEventType::InvocationFailed => {
                warn!(
                    event_type = ?event.event_type,
                    handler_id = %event.handler_id,
                    request_id = %event.request_id,
                    "Telemetry: invocation failed"
                );
            }
            _ => {
                info!(
                    event_type = ?event.event_type,
                    handler_id = %event.handler_id,
                    request_id = %event.request_id,
                    "Telemetry event"
                );
            }
        }

        if self.emit_json {
            if let Ok(json) = serde_json::to_string(&event) {
                debug!(telemetry = %json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_with_config() {
        let emitter = TelemetryEmitter::with_config("term-get", false);
        assert_eq!(emitter.handler_id(), "term-get");
        assert!(!emitter.emit_json);
    }

    #[test]
    fn test_telemetry_event_serialization() {
        let emitter = TelemetryEmitter::with_config("term-get", true);
        let event = emitter.event(
            TelemetryEventType::InvocationCompleted,
            Uuid::new_v4(),
            serde_json::json!({ "record_count": 3 }),
            Some(Duration::from_millis(42)),
        );

        let json = serde_json::to_string(&event).expect("Serialization should succeed");
        assert!(json.contains("invocation_completed"));
        assert!(json.contains(r#""duration_ms":42"#));
    }
}

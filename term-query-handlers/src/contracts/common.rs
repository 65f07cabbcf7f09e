//! Common Contract Types
//!
//! Response envelopes shared by the handler and its HTTP front ends.

use serde::{Deserialize, Serialize};

/// `error` value reported when the query service call fails.
pub const UPSTREAM_INVOKE_FAILED: &str = "Upstream query service invoke failed";

/// Structured error body returned with non-success responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short, stable description of what failed
    pub error: String,

    /// Underlying error message
    pub detail: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }

    /// Envelope for a failed query service invocation.
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::new(UPSTREAM_INVOKE_FAILED, detail)
    }

    /// Render as a JSON body.
    pub fn to_body(&self) -> String {
        serde_json::json!({
            "error": self.error,
            "detail": self.detail,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_envelope_body() {
        let body = ErrorEnvelope::upstream("timeout").to_body();

        assert!(body.contains(r#""detail":"timeout""#));
        let parsed: ErrorEnvelope = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.error, UPSTREAM_INVOKE_FAILED);
    }
}

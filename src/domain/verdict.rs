//! Anomaly verdict attached to every telemetry message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status reported when the enrichment service gave no usable answer.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Explanation reported alongside [`UNKNOWN_STATUS`].
pub const FALLBACK_EXPLANATION: &str = "enrichment service unreachable";

/// Legacy name of the `status` field.
const LEGACY_STATUS_FIELD: &str = "system_status";

/// Verdict returned by the anomaly-detection service.
///
/// Only a string `status` is required. Older service builds name it
/// `system_status`; it is used when `status` is absent. When both are
/// present `status` wins and `system_status` stays in `extra`. A missing or
/// `null` explanation becomes the empty string. Any other response fields
/// are kept in `extra` and merged into the enriched message as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Verdict {
    /// Verdict label, e.g. `"normal"`, `"anomaly"` or `"unknown"`.
    pub status: String,
    /// Human-readable explanation; empty when the service gave none.
    pub explanation: String,
    /// Additional fields carried through from the service response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reason a service response is not a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerdictError {
    /// Neither `status` nor `system_status` is present.
    #[error("missing status field")]
    MissingStatus,
    /// A field has the wrong JSON type.
    #[error("field `{0}` must be a string")]
    NotAString(&'static str),
}

impl TryFrom<Map<String, Value>> for Verdict {
    type Error = VerdictError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let status = match fields.remove("status") {
            Some(Value::String(status)) => status,
            Some(_) => return Err(VerdictError::NotAString("status")),
            None => match fields.remove(LEGACY_STATUS_FIELD) {
                Some(Value::String(status)) => status,
                Some(_) => return Err(VerdictError::NotAString(LEGACY_STATUS_FIELD)),
                None => return Err(VerdictError::MissingStatus),
            },
        };
        let explanation = match fields.remove("explanation") {
            Some(Value::String(explanation)) => explanation,
            Some(Value::Null) | None => String::new(),
            Some(_) => return Err(VerdictError::NotAString("explanation")),
        };
        Ok(Self {
            status,
            explanation,
            extra: fields,
        })
    }
}

impl Verdict {
    /// The fallback verdict used whenever enrichment fails.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: UNKNOWN_STATUS.to_string(),
            explanation: FALLBACK_EXPLANATION.to_string(),
            extra: Map::new(),
        }
    }

    /// Flattens the verdict into JSON object fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = self.extra;
        fields.insert("status".to_string(), Value::String(self.status));
        fields.insert("explanation".to_string(), Value::String(self.explanation));
        fields
    }
}

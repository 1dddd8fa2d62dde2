//! Response envelopes shared by every JSON endpoint.
//!
//! Success bodies carry `success: true` next to the payload; failures carry
//! `success: false` and the error message under `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::schemas::ErrorCodeSchema;

/// Failure body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureEnvelope {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Human-readable message.
    #[schema(example = "User not found")]
    pub error: String,
    /// Stable machine-readable error code.
    #[schema(value_type = ErrorCodeSchema)]
    pub code: ErrorCode,
    /// Correlation identifier matching the `trace-id` response header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Field-level context for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&Error> for FailureEnvelope {
    fn from(error: &Error) -> Self {
        Self {
            success: false,
            error: error.message().to_owned(),
            code: error.code(),
            trace_id: error.trace_id().map(str::to_owned),
            details: error.details().cloned(),
        }
    }
}

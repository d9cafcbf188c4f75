//! Decoding for the backend's JSON-in-a-string reply.
//!
//! The analysis endpoint returns `{"result": "<json>"}` where the inner
//! document may arrive wrapped in Markdown code fences. All fence handling
//! lives here so a backend format change touches one place.

use crate::error::ScanError;
use crate::model::DeviceAnalysis;

/// Strip a leading ```` ```json ```` / ```` ``` ```` marker and a trailing
/// ```` ``` ```` marker if present. Unfenced input comes back unchanged,
/// which also makes the function idempotent.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    s = s.trim_start();
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

pub fn decode_analysis(raw: &str) -> Result<DeviceAnalysis, ScanError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body).map_err(|e| ScanError::MalformedAnalysisPayload(e.to_string()))
}

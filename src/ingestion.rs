use crate::error::Result;
use crate::schema::RawStatement;
use serde_json::Value;

/// Parses the extraction service's JSON payload into a [`RawStatement`].
/// Any object is accepted; per-key value types are sorted out later by the
/// normalizer. A non-object payload is a boundary error.
pub fn raw_statement_from_json(json: &str) -> Result<RawStatement> {
    Ok(serde_json::from_str(json)?)
}

pub fn raw_statement_from_value(value: Value) -> Result<RawStatement> {
    Ok(serde_json::from_value(value)?)
}

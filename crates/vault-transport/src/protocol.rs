//! JSON envelopes exchanged with the ledger endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing JSON request
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    #[serde(rename = "type")]
    pub request_type: &'a str,
    pub ticket: i64,
    pub data: Value,
}

/// Incoming response, for JSON and binary requests alike
#[derive(Debug, Deserialize)]
pub struct Response {
    pub ticket: i64,
    #[serde(default)]
    pub data: Value,
}

/// Render response data as the string a binary request resolves to
pub fn data_to_string(data: Value) -> String {
    match data {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

//! Graylog REST API types.
//!
//! This module defines the request and response bodies exchanged with the
//! `system/sessions` and `system/inputs` endpoints.

use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::planner::AttributeMap;

/// Session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest<'a> {
    /// User name.
    pub username: &'a str,
    /// Password.
    pub password: &'a str,
    /// Originating host, left empty.
    pub host: &'a str,
}

/// Session creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    /// Session token used as the basic-auth user name.
    #[serde(rename = "session_id", default)]
    pub token: String,
    /// Session expiry timestamp as reported by the server.
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// Error body returned by Graylog on failed requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    /// Error type (e.g. `ApiError`).
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// An input exactly as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSummary {
    /// Server-assigned identifier.
    pub id: String,
    /// Input title.
    #[serde(default)]
    pub title: String,
    /// Input class.
    #[serde(rename = "type", default)]
    pub input_type: String,
    /// Whether the input runs on every node.
    #[serde(default)]
    pub global: bool,
    /// Node the input is bound to, for non-global inputs.
    #[serde(default)]
    pub node: Option<String>,
    /// Untyped configuration payload.
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// An input as reported by the server.
///
/// Fetched fresh at the start of each pass and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedInput {
    /// Server-assigned identifier.
    pub id: String,
    /// Input title.
    pub title: String,
    /// Input class.
    pub input_type: String,
    /// Whether the input runs on every node.
    pub global: bool,
    /// Node the input is bound to, for non-global inputs.
    pub node: Option<String>,
    /// Configuration payload.
    pub attributes: AttributeMap,
}

impl TryFrom<InputSummary> for ObservedInput {
    type Error = CompareError;

    fn try_from(summary: InputSummary) -> Result<Self, Self::Error> {
        Ok(Self {
            attributes: AttributeMap::try_from(summary.attributes)?,
            id: summary.id,
            title: summary.title,
            input_type: summary.input_type,
            global: summary.global,
            node: summary.node,
        })
    }
}

/// Response of `GET system/inputs`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputListResponse {
    /// Number of inputs.
    #[serde(default)]
    pub total: usize,
    /// All inputs.
    #[serde(default)]
    pub inputs: Vec<InputSummary>,
}

/// Response of `POST system/inputs` and `PUT system/inputs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputIdResponse {
    /// Identifier of the affected input.
    #[serde(default)]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::AttrValue;

    #[test]
    fn test_decode_input_list() {
        let body = r#"{
            "total": 1,
            "inputs": [{
                "id": "5ae5b1e2c9e77c0001ed0b13",
                "title": "syslog-udp",
                "type": "org.graylog2.inputs.syslog.udp.SyslogUDPInput",
                "global": true,
                "node": null,
                "created_at": "2018-04-29T12:00:00.000Z",
                "attributes": { "bind_address": "0.0.0.0", "port": 1514 }
            }]
        }"#;

        let list: InputListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(list.total, 1);
        let input = ObservedInput::try_from(list.inputs[0].clone()).unwrap();
        assert_eq!(input.title, "syslog-udp");
        assert!(input.global);
        assert_eq!(input.attributes.get("port"), Some(&AttrValue::Number(1514.0)));
    }

    #[test]
    fn test_missing_attributes_decode_empty() {
        let summary: InputSummary =
            serde_json::from_str(r#"{ "id": "x1", "title": "a", "type": "t" }"#).unwrap();
        let input = ObservedInput::try_from(summary).unwrap();
        assert!(input.attributes.is_empty());
        assert!(!input.global);
    }

    #[test]
    fn test_non_object_attributes_violate_contract() {
        let summary: InputSummary =
            serde_json::from_str(r#"{ "id": "x1", "attributes": [1514] }"#).unwrap();
        let err = ObservedInput::try_from(summary).unwrap_err();
        assert_eq!(err, CompareError::ContractViolation { found: "array" });
    }
}

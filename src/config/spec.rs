//! Configuration specification types for graylog-state.
//!
//! This module defines the structs that map to the `graylog-state.yaml`
//! document. The `inputs` list is the desired state: it is read once per
//! reconciliation pass and never mutated.

use serde::{Deserialize, Serialize};

use crate::planner::FieldValue;

/// The root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateConfig {
    /// Graylog API connection settings.
    pub api: ApiConfig,
    /// Inputs that should exist on the server.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
}

/// Graylog API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g. `http://127.0.0.1:9000/api`).
    #[serde(default)]
    pub url: String,
    /// User name for session authentication.
    #[serde(default)]
    pub user: String,
    /// Password for session authentication.
    #[serde(default)]
    pub pass: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Desired definition of a single Graylog input.
///
/// `title` is the business key used to correlate with observed inputs. It is
/// expected to be unique within the document but this is not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputSpec {
    /// Human-assigned title.
    #[serde(default)]
    pub title: String,
    /// Graylog input class (e.g. `org.graylog2.inputs.syslog.udp.SyslogUDPInput`).
    #[serde(rename = "type", default)]
    pub input_type: String,
    /// Whether the input runs on every node.
    #[serde(default)]
    pub global: bool,
    /// Input configuration.
    #[serde(default)]
    pub configuration: InputConfiguration,
}

/// Input configuration record.
///
/// Every field is optional: a zero value (`false`, `0`, `""`) means "not
/// specified" and is left out of both the API payload and the comparison
/// with the observed input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfiguration {
    /// Allow the message to override the received date.
    #[serde(skip_serializing_if = "is_false")]
    pub allow_override_date: bool,
    /// Address to bind to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bind_address: String,
    /// Expand RFC 5424 structured data.
    #[serde(skip_serializing_if = "is_false")]
    pub expand_structured_data: bool,
    /// Force reverse DNS lookup of the sender.
    #[serde(skip_serializing_if = "is_false")]
    pub force_rdns: bool,
    /// Maximum message size in bytes.
    #[serde(skip_serializing_if = "is_zero")]
    pub max_message_size: i64,
    /// Override the message source with the sender address.
    #[serde(skip_serializing_if = "is_false")]
    pub override_source: bool,
    /// Port to listen on.
    #[serde(skip_serializing_if = "is_zero")]
    pub port: i64,
    /// Receive buffer size in bytes.
    #[serde(skip_serializing_if = "is_zero")]
    pub recv_buffer_size: i64,
    /// Store the full original message.
    #[serde(skip_serializing_if = "is_false")]
    pub store_full_message: bool,
    /// Enable TCP keepalive.
    #[serde(skip_serializing_if = "is_false")]
    pub tcp_keepalive: bool,
    /// TLS certificate file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_cert_file: String,
    /// TLS client authentication mode.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_auth: String,
    /// TLS client authentication trusted certificates.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_client_auth_cert_file: String,
    /// Enable TLS.
    #[serde(skip_serializing_if = "is_false")]
    pub tls_enable: bool,
    /// TLS private key file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_key_file: String,
    /// TLS private key password.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_key_password: String,
    /// Use null byte as frame delimiter.
    #[serde(skip_serializing_if = "is_false")]
    pub use_null_delimiter: bool,
}

/// Number of declared configuration fields.
pub const CONFIGURATION_FIELD_COUNT: usize = 17;

impl InputConfiguration {
    /// Returns the declared field table: every field name paired with its
    /// typed value, in declaration order.
    ///
    /// Names match the keys Graylog uses in an input's `attributes`.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); CONFIGURATION_FIELD_COUNT] {
        [
            ("allow_override_date", FieldValue::Bool(self.allow_override_date)),
            ("bind_address", FieldValue::Str(&self.bind_address)),
            ("expand_structured_data", FieldValue::Bool(self.expand_structured_data)),
            ("force_rdns", FieldValue::Bool(self.force_rdns)),
            ("max_message_size", FieldValue::Int(self.max_message_size)),
            ("override_source", FieldValue::Bool(self.override_source)),
            ("port", FieldValue::Int(self.port)),
            ("recv_buffer_size", FieldValue::Int(self.recv_buffer_size)),
            ("store_full_message", FieldValue::Bool(self.store_full_message)),
            ("tcp_keepalive", FieldValue::Bool(self.tcp_keepalive)),
            ("tls_cert_file", FieldValue::Str(&self.tls_cert_file)),
            ("tls_client_auth", FieldValue::Str(&self.tls_client_auth)),
            ("tls_client_auth_cert_file", FieldValue::Str(&self.tls_client_auth_cert_file)),
            ("tls_enable", FieldValue::Bool(self.tls_enable)),
            ("tls_key_file", FieldValue::Str(&self.tls_key_file)),
            ("tls_key_password", FieldValue::Str(&self.tls_key_password)),
            ("use_null_delimiter", FieldValue::Bool(self.use_null_delimiter)),
        ]
    }

    /// Iterates only the populated (non-zero) fields.
    pub fn populated_fields(&self) -> impl Iterator<Item = (&'static str, FieldValue<'_>)> {
        self.fields().into_iter().filter(|(_, value)| !value.is_zero())
    }

    /// Returns true if no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.populated_fields().next().is_none()
    }
}

impl StateConfig {
    /// Finds the first desired input with the given title.
    #[must_use]
    pub fn find_input(&self, title: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.title == title)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: String::new(),
            pass: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_table_covers_every_field() {
        let conf = InputConfiguration {
            allow_override_date: true,
            bind_address: String::from("0.0.0.0"),
            expand_structured_data: true,
            force_rdns: true,
            max_message_size: 2_097_152,
            override_source: true,
            port: 1514,
            recv_buffer_size: 262_144,
            store_full_message: true,
            tcp_keepalive: true,
            tls_cert_file: String::from("/etc/cert.pem"),
            tls_client_auth: String::from("optional"),
            tls_client_auth_cert_file: String::from("/etc/ca.pem"),
            tls_enable: true,
            tls_key_file: String::from("/etc/key.pem"),
            tls_key_password: String::from("hunter2"),
            use_null_delimiter: true,
        };

        assert_eq!(conf.populated_fields().count(), CONFIGURATION_FIELD_COUNT);

        // Every serialized key appears in the table.
        let json = serde_json::to_value(&conf).unwrap();
        let keys: Vec<&str> = conf.fields().iter().map(|(name, _)| *name).collect();
        for key in json.as_object().unwrap().keys() {
            assert!(keys.contains(&key.as_str()), "missing {key}");
        }
    }

    #[test]
    fn test_zero_fields_are_not_serialized() {
        let conf = InputConfiguration {
            port: 1514,
            ..InputConfiguration::default()
        };
        let json = serde_json::to_string(&conf).unwrap();
        assert_eq!(json, r#"{"port":1514}"#);
    }

    #[test]
    fn test_empty_configuration() {
        assert!(InputConfiguration::default().is_empty());
        let conf = InputConfiguration {
            tcp_keepalive: true,
            ..InputConfiguration::default()
        };
        assert!(!conf.is_empty());
    }

    #[test]
    fn test_input_spec_payload_shape() {
        let input = InputSpec {
            title: String::from("syslog"),
            input_type: String::from("org.graylog2.inputs.syslog.udp.SyslogUDPInput"),
            global: true,
            configuration: InputConfiguration {
                bind_address: String::from("0.0.0.0"),
                port: 1514,
                ..InputConfiguration::default()
            },
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "org.graylog2.inputs.syslog.udp.SyslogUDPInput");
        assert_eq!(json["global"], true);
        assert_eq!(json["configuration"]["port"], 1514);
        assert!(json["configuration"].get("tls_enable").is_none());
    }
}

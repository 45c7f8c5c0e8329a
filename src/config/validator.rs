//! Configuration validation for the state document.
//!
//! This module checks the API settings and every input definition before
//! any request is made to the server.

use crate::error::{ConfigError, GraylogStateError, Result};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{ApiConfig, InputSpec, StateConfig};

/// Accepted values for `tls_client_auth`.
const TLS_CLIENT_AUTH_MODES: &[&str] = &["disabled", "optional", "required"];

/// Highest valid TCP/UDP port.
const MAX_PORT: i64 = 65_535;

/// Validator for state documents.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a state document.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &StateConfig) -> Result<ValidationResult> {
        let result = self.check(config);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(GraylogStateError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Runs every check and collects all errors and warnings.
    #[must_use]
    pub fn check(&self, config: &StateConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_api(&config.api, &mut result);
        Self::validate_inputs(&config.inputs, &mut result);

        result
    }

    /// Validates API connection settings.
    fn validate_api(api: &ApiConfig, result: &mut ValidationResult) {
        if api.url.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("api.url"),
                message: String::from("API URL cannot be empty"),
            });
        } else {
            match reqwest::Url::parse(&api.url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => result.errors.push(ValidationError {
                    field: String::from("api.url"),
                    message: format!("API URL scheme must be http or https, got '{}'", url.scheme()),
                }),
                Err(e) => result.errors.push(ValidationError {
                    field: String::from("api.url"),
                    message: format!("API URL '{}' is invalid: {e}", api.url),
                }),
            }
        }

        if api.user.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("api.user"),
                message: String::from("API user cannot be empty"),
            });
        }

        if api.pass.is_empty() {
            result
                .warnings
                .push(String::from("api.pass is empty; set it or GRAYLOG_STATE_API_PASS"));
        }

        if api.timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("api.timeout_secs"),
                message: String::from("Request timeout must be at least 1 second"),
            });
        }
    }

    /// Validates all input definitions.
    fn validate_inputs(inputs: &[InputSpec], result: &mut ValidationResult) {
        let mut seen_titles = HashSet::new();

        for (i, input) in inputs.iter().enumerate() {
            let prefix = format!("inputs[{i}]");

            if input.title.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.title"),
                    message: String::from("Input title cannot be empty"),
                });
            } else if !seen_titles.insert(input.title.as_str()) {
                result.warnings.push(format!(
                    "{prefix}: duplicate title '{}'; only the first server input with this title is reconciled",
                    input.title
                ));
            }

            if input.input_type.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.type"),
                    message: format!("Input '{}' has no type", input.title),
                });
            }

            Self::validate_configuration(input, &prefix, result);
        }
    }

    /// Validates one input's configuration block.
    fn validate_configuration(input: &InputSpec, prefix: &str, result: &mut ValidationResult) {
        let conf = &input.configuration;

        if !(0..=MAX_PORT).contains(&conf.port) {
            result.errors.push(ValidationError {
                field: format!("{prefix}.configuration.port"),
                message: format!("Port {} is out of range (1-{MAX_PORT})", conf.port),
            });
        }

        for (field, value) in [
            ("max_message_size", conf.max_message_size),
            ("recv_buffer_size", conf.recv_buffer_size),
        ] {
            if value < 0 {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.configuration.{field}"),
                    message: format!("{field} cannot be negative"),
                });
            }
        }

        if conf.tls_enable && (conf.tls_cert_file.is_empty() || conf.tls_key_file.is_empty()) {
            result.warnings.push(format!(
                "{prefix}: TLS is enabled for '{}' but tls_cert_file or tls_key_file is not set",
                input.title
            ));
        }

        if !conf.tls_client_auth.is_empty()
            && !TLS_CLIENT_AUTH_MODES.contains(&conf.tls_client_auth.as_str())
        {
            result.warnings.push(format!(
                "{prefix}: unknown tls_client_auth '{}' (expected one of {})",
                conf.tls_client_auth,
                TLS_CLIENT_AUTH_MODES.join(", ")
            ));
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfiguration;

    fn valid_config() -> StateConfig {
        StateConfig {
            api: ApiConfig {
                url: String::from("http://127.0.0.1:9000/api"),
                user: String::from("admin"),
                pass: String::from("admin"),
                ..ApiConfig::default()
            },
            inputs: vec![InputSpec {
                title: String::from("syslog-udp"),
                input_type: String::from("org.graylog2.inputs.syslog.udp.SyslogUDPInput"),
                global: true,
                configuration: InputConfiguration {
                    bind_address: String::from("0.0.0.0"),
                    port: 1514,
                    ..InputConfiguration::default()
                },
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let result = ConfigValidator::new().validate(&valid_config()).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_invalid_api() {
        let mut config = valid_config();
        config.api.url = String::from("ftp://graylog");
        config.api.user = String::new();

        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.errors[0].field, "api.url");
        assert_eq!(result.errors[1].field, "api.user");

        config.api.url = String::from("not a url");
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("is invalid"));
    }

    #[test]
    fn test_invalid_input() {
        let mut config = valid_config();
        config.inputs[0].title = String::new();
        config.inputs[0].input_type = String::new();
        config.inputs[0].configuration.port = 70_000;

        let result = ConfigValidator::new().check(&config);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "inputs[0].title",
                "inputs[0].type",
                "inputs[0].configuration.port"
            ]
        );
    }

    #[test]
    fn test_duplicate_titles_warn() {
        let mut config = valid_config();
        config.inputs.push(config.inputs[0].clone());

        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warning_count(), 1);
        assert!(result.warnings[0].contains("duplicate title 'syslog-udp'"));
    }

    #[test]
    fn test_tls_warnings() {
        let mut config = valid_config();
        config.inputs[0].configuration.tls_enable = true;
        config.inputs[0].configuration.tls_client_auth = String::from("sometimes");

        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warning_count(), 2);
    }
}

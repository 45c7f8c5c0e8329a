//! Configuration module for graylog-state.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `graylog-state.yaml`
//! - Validation of configuration values
//! - Fingerprinting the desired input set

mod hash;
mod parser;
mod spec;
mod validator;

pub use hash::ConfigHasher;
pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, ENV_API_PASS, ENV_API_URL, ENV_API_USER,
    find_config_file,
};
pub use spec::{ApiConfig, CONFIGURATION_FIELD_COUNT, InputConfiguration, InputSpec, StateConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};

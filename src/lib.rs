// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # graylog-state
//!
//! A declarative, idempotent reconciler for Graylog inputs.
//!
//! ## Overview
//!
//! graylog-state keeps the inputs of a Graylog server in line with a YAML
//! document, allowing you to:
//!
//! - Declare inputs as code, keyed by their title
//! - Preview the create, update and delete operations a pass would perform
//! - Apply them against the Graylog REST API
//! - Detect drift between the document and the server
//!
//! ## Architecture
//!
//! Each pass follows the same shape:
//!
//! 1. **Desired State**: the `inputs` list of `graylog-state.yaml`
//! 2. **Observed State**: fetched once from `system/inputs`
//! 3. **Diff**: typed configuration fields are compared one-sided against the
//!    untyped `attributes` of the matching input
//! 4. **Plan & Execute**: operations are applied in order, stopping at the
//!    first failure
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing, validation and fingerprinting
//! - [`graylog`]: Graylog API client and wire types
//! - [`remote`]: The remote-state port used by the executor
//! - [`planner`]: Value comparison, diffing, planning and execution
//! - [`reconciler`]: One full reconciliation pass
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! api:
//!   url: http://127.0.0.1:9000/api
//!   user: admin
//!   pass: secret
//!
//! inputs:
//!   - title: syslog-udp
//!     type: org.graylog2.inputs.syslog.udp.SyslogUDPInput
//!     global: true
//!     configuration:
//!       bind_address: 0.0.0.0
//!       port: 1514
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod graylog;
pub mod planner;
pub mod reconciler;
pub mod remote;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigHasher, ConfigParser, ConfigValidator, InputSpec, StateConfig};
pub use error::{GraylogStateError, Result};
pub use graylog::{GraylogClient, ObservedInput};
pub use planner::{DiffEngine, Operation, PlanExecutor, SyncPlan, reconcile};
pub use reconciler::{DriftReport, ReconciliationResult, Reconciler};
pub use remote::RemoteState;

//! Graylog API integration.
//!
//! This module provides the session-authenticated client for the Graylog
//! REST API and the wire types it exchanges.

mod client;
mod types;

pub use client::GraylogClient;
pub use types::{
    ErrorResponse, InputIdResponse, InputListResponse, InputSummary, ObservedInput,
    SessionRequest, SessionResponse,
};

//! Remote-state port.
//!
//! The reconciliation core depends on this interface to observe and mutate
//! inputs on the server. Every call reports success or failure explicitly,
//! and the executor treats any failure as fatal for the pass.

use async_trait::async_trait;

use crate::config::InputSpec;
use crate::error::Result;
use crate::graylog::ObservedInput;

/// Access to the inputs held by a remote system.
#[async_trait]
pub trait RemoteState: Send + Sync {
    /// Fetches every input currently on the remote.
    async fn fetch_all(&self) -> Result<Vec<ObservedInput>>;

    /// Creates an input and returns its new identifier.
    async fn create(&self, input: &InputSpec) -> Result<String>;

    /// Replaces the definition of an existing input.
    async fn update(&self, id: &str, input: &InputSpec) -> Result<()>;

    /// Deletes an input.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Short name of the backend, for log lines.
    fn backend_type(&self) -> &'static str;
}


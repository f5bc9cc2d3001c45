/// The write-back boundary to the embedding host.
///
/// The core never talks to the host platform directly; it drives this trait
/// and a thin adapter in the host app implements it against the real SDK
/// (variables and action triggers). Both calls settle asynchronously and
/// either succeed or reject with a message; there is nothing to read back.
use async_trait::async_trait;

use crate::types::CellValue;

/// A rejected host call. Carries only the host's message; the caller decides
/// how to surface it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Host sink for pushing user-initiated changes back into the host's data
/// source. Implementations live in the embedding application.
#[async_trait]
pub trait HostWriteback: Send + Sync {
    /// Set a host-managed variable by name.
    async fn set_variable(&self, name: &str, value: &CellValue) -> Result<(), HostError>;

    /// Fire a host action trigger by name.
    async fn trigger_action(&self, name: &str) -> Result<(), HostError>;
}

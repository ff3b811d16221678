use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    /// The connectivity flag never came up within the allowed window.
    #[error("broker connection timed out after {0:?}")]
    ConnectionTimeout(Duration),

    /// The transport attempt itself failed (refused, unresolvable
    /// host, protocol rejection).
    #[error("broker connection failed: {0}")]
    ConnectionError(String),

    /// A publish call reported non-success. Frames are never retried.
    #[error("frame publish failed: {0}")]
    PublishFailure(String),
}

//! Session driver errors

use thiserror::Error;

/// Errors surfaced to the host holding a session handle
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was torn down (or its driver dropped) before the
    /// completion signal fired.
    #[error("session was torn down before completion")]
    TornDown,
}

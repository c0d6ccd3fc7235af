//! The narrow bus seam the validator runs against.
//!
//! Keeping this to two operations (enumerate modems, fetch one object's
//! properties) lets the whole oracle run unchanged against the live
//! system bus or a recorded session ([`crate::replay::ReplayBus`]).

use thiserror::Error;

use crate::props::{ObjectKind, PropertySnapshot};

/// Transport-level failure talking to the telephony service.
///
/// Never retried and never masked: a failure aborts validation of the
/// current modem path only, and is surfaced to the harness as-is.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to connect to the system bus: {0}")]
    Connect(String),
    #[error("bus call {method} on {path} failed: {message}")]
    Call {
        path: String,
        method: String,
        message: String,
    },
    #[error("no recorded objects for modem path {0}")]
    NotRecorded(String),
}

/// Read-only view of the telephony service's object tree.
pub trait ModemBus {
    /// Enumerate all modem object paths the service exposes.
    fn modem_paths(&self) -> Result<Vec<String>, BusError>;

    /// Fetch the full property map of one object under `path`.
    ///
    /// Blocking round-trip; no timeout is imposed here.
    fn properties(&self, path: &str, object: ObjectKind) -> Result<PropertySnapshot, BusError>;
}

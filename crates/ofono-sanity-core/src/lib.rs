//! Conformance oracle for the oFono telephony daemon.
//!
//! Given a modem's runtime state — power state, SIM presence, and device
//! variant — the oracle derives the features, interfaces, and property
//! values oFono must advertise, then holds the daemon's live (or recorded)
//! property snapshots to them. Per-device quirks are rows in override
//! tables, not scattered branches.
//!
//! The crate is pure decision logic: the only I/O boundary is the
//! [`bus::ModemBus`] trait, implemented by the CLI's live zbus client and
//! by [`replay::ReplayBus`] for tests and offline captures.

pub mod bus;
pub mod classify;
pub mod props;
pub mod replay;
pub mod report;
pub mod tables;
pub mod validate;

pub use bus::{BusError, ModemBus};
pub use classify::{ExpectationProfile, ModemState, PowerState, classify};
pub use props::{ObjectKind, PropValue, PropertySnapshot};
pub use report::{ModemOutcome, RunSummary, run_all, run_paths};
pub use validate::{
    CallerExpectations, CheckRecord, Discrepancy, ValidationReport, validate_modem,
};

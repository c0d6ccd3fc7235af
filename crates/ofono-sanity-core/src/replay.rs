//! Recorded bus sessions — the fake side of the [`ModemBus`] seam.
//!
//! A [`Recording`] holds the snapshots captured from one live session (or
//! written by hand in tests) and replays them through the same trait the
//! live client implements, so the oracle can be exercised without a
//! running oFono.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bus::{BusError, ModemBus};
use crate::props::{ObjectKind, PropertySnapshot};

/// One modem path's captured objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedModem {
    pub path: String,
    /// Missing object kinds replay as transport failures, which is exactly
    /// what a vanished sub-object looks like on the live bus.
    pub objects: BTreeMap<ObjectKind, PropertySnapshot>,
}

/// A full captured session: every modem path and its object snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub modems: Vec<RecordedModem>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modem: RecordedModem) {
        self.modems.push(modem);
    }
}

/// Replays a [`Recording`] through the bus seam.
pub struct ReplayBus {
    recording: Recording,
}

impl ReplayBus {
    pub fn new(recording: Recording) -> Self {
        Self { recording }
    }
}

impl ModemBus for ReplayBus {
    fn modem_paths(&self) -> Result<Vec<String>, BusError> {
        Ok(self
            .recording
            .modems
            .iter()
            .map(|m| m.path.clone())
            .collect())
    }

    fn properties(&self, path: &str, object: ObjectKind) -> Result<PropertySnapshot, BusError> {
        self.recording
            .modems
            .iter()
            .find(|m| m.path == path)
            .and_then(|m| m.objects.get(&object))
            .cloned()
            .ok_or_else(|| BusError::NotRecorded(format!("{path} ({})", object.interface())))
    }
}

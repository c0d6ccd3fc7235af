//! Run orchestration — one modem fully validated before the next.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bus::ModemBus;
use crate::validate::{CallerExpectations, ValidationReport, validate_modem};

/// Outcome for one modem path: a full report, or the transport failure
/// that aborted it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModemOutcome {
    Validated(ValidationReport),
    Transport { modem_path: String, error: String },
}

impl ModemOutcome {
    pub fn passed(&self) -> bool {
        match self {
            ModemOutcome::Validated(report) => report.passed(),
            ModemOutcome::Transport { .. } => false,
        }
    }

    pub fn modem_path(&self) -> &str {
        match self {
            ModemOutcome::Validated(report) => &report.modem_path,
            ModemOutcome::Transport { modem_path, .. } => modem_path,
        }
    }
}

/// Aggregate outcome across the whole modem set.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcomes: Vec<ModemOutcome>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(ModemOutcome::passed)
    }

    pub fn reports(&self) -> impl Iterator<Item = &ValidationReport> {
        self.outcomes.iter().filter_map(|o| match o {
            ModemOutcome::Validated(report) => Some(report),
            ModemOutcome::Transport { .. } => None,
        })
    }
}

/// Validate every modem the service exposes, sequentially.
///
/// A transport failure on one path is recorded and the run moves on; only
/// a failure to enumerate the modem set at all is fatal.
pub fn run_all(
    bus: &dyn ModemBus,
    variant: &str,
    caller: &CallerExpectations,
) -> Result<RunSummary, crate::bus::BusError> {
    let paths = bus.modem_paths()?;
    info!(modems = paths.len(), variant, "starting conformance run");
    Ok(run_paths(bus, &paths, variant, caller))
}

/// Validate an explicit list of modem paths, sequentially.
pub fn run_paths(
    bus: &dyn ModemBus,
    paths: &[String],
    variant: &str,
    caller: &CallerExpectations,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for path in paths {
        match validate_modem(bus, path, variant, caller) {
            Ok(report) => {
                let failures = report.failures().count();
                if failures > 0 {
                    warn!(path = %path, failures, "modem failed conformance");
                } else {
                    info!(path = %path, checks = report.checks.len(), "modem passed");
                }
                summary.outcomes.push(ModemOutcome::Validated(report));
            }
            Err(error) => {
                warn!(path = %path, %error, "transport failure, skipping modem");
                summary.outcomes.push(ModemOutcome::Transport {
                    modem_path: path.clone(),
                    error: error.to_string(),
                });
            }
        }
    }
    summary
}

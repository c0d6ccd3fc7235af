//! Property validator — holds one modem's live snapshots to its profile.
//!
//! Checks never short-circuit: a single run surfaces every discrepancy,
//! not just the first. Each check is a pure function of the snapshots, so
//! validating unchanged snapshots twice yields identical reports.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::bus::{BusError, ModemBus};
use crate::classify::{ExpectationProfile, ModemState, PowerState, classify};
use crate::props::{ObjectKind, PropValue, PropertySnapshot};
use crate::tables;

/// Caller-supplied identity expectations for variants without a canned SIM.
///
/// Loaded from CLI flags or a TOML file; any field left unset means the
/// corresponding property is non-deterministic and goes unasserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallerExpectations {
    pub mcc: Option<String>,
    pub mnc: Option<String>,
    pub subscriber_identity: Option<String>,
}

/// One recorded conformance failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// A required key is absent from the snapshot. Distinct from a wrong
    /// value on purpose: the harness treats the two differently.
    #[error("{object}: required property {property} is missing")]
    MissingProperty { object: ObjectKind, property: String },

    #[error("{object}.{property}: expected {expected}, got {actual}")]
    ValueMismatch {
        object: ObjectKind,
        property: String,
        expected: String,
        actual: String,
    },

    /// The reported set fails to contain required entries. Carries the
    /// specific missing elements, not merely pass/fail.
    #[error("{object}.{property} is missing required entries: {}", missing.join(", "))]
    SetContainment {
        object: ObjectKind,
        property: String,
        missing: Vec<String>,
    },
}

/// One assertion's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub object: ObjectKind,
    pub property: String,
    pub expected: String,
    pub actual: String,
    pub failure: Option<Discrepancy>,
}

impl CheckRecord {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Every assertion run against one modem path, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub modem_path: String,
    pub state: ModemState,
    pub checks: Vec<CheckRecord>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckRecord::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckRecord> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// Accumulates check records for one object's snapshot.
struct Checker<'a> {
    object: ObjectKind,
    snapshot: &'a PropertySnapshot,
    checks: Vec<CheckRecord>,
    /// Keys already reported missing; value checks skip these instead of
    /// double-reporting.
    missing: Vec<String>,
}

impl<'a> Checker<'a> {
    fn new(object: ObjectKind, snapshot: &'a PropertySnapshot) -> Self {
        Self {
            object,
            snapshot,
            checks: Vec::new(),
            missing: Vec::new(),
        }
    }

    fn pass(&mut self, property: &str, expected: impl Into<String>, actual: impl Into<String>) {
        self.checks.push(CheckRecord {
            object: self.object,
            property: property.to_owned(),
            expected: expected.into(),
            actual: actual.into(),
            failure: None,
        });
    }

    fn fail(
        &mut self,
        property: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
        failure: Discrepancy,
    ) {
        self.checks.push(CheckRecord {
            object: self.object,
            property: property.to_owned(),
            expected: expected.into(),
            actual: actual.into(),
            failure: Some(failure),
        });
    }

    fn report_missing(&mut self, property: &str, expected: impl Into<String>) {
        self.missing.push(property.to_owned());
        let failure = Discrepancy::MissingProperty {
            object: self.object,
            property: property.to_owned(),
        };
        self.fail(property, expected, "<absent>", failure);
    }

    /// Presence-only check for one required key.
    fn require_present(&mut self, property: &str) {
        if self.snapshot.contains(property) {
            self.pass(property, "present", "present");
        } else {
            self.report_missing(property, "present");
        }
    }

    /// Fetch a key for a value check; `None` means the key was absent and
    /// has been reported (unless the presence pass already did).
    fn lookup(&mut self, property: &str, expected: &str) -> Option<&'a PropValue> {
        if let Some(value) = self.snapshot.get(property) {
            return Some(value);
        }
        if !self.missing.iter().any(|m| m == property) {
            self.report_missing(property, expected);
        }
        None
    }

    fn mismatch(&mut self, property: &str, expected: &str, actual: &PropValue) {
        let failure = Discrepancy::ValueMismatch {
            object: self.object,
            property: property.to_owned(),
            expected: expected.to_owned(),
            actual: actual.to_string(),
        };
        self.fail(property, expected, actual.to_string(), failure);
    }

    fn expect_str(&mut self, property: &str, want: &str) {
        let expected = format!("{want:?}");
        if let Some(value) = self.lookup(property, &expected) {
            if value.as_str() == Some(want) {
                self.pass(property, expected, value.to_string());
            } else {
                self.mismatch(property, &expected, value);
            }
        }
    }

    fn expect_bool(&mut self, property: &str, want: bool) {
        let expected = want.to_string();
        if let Some(value) = self.lookup(property, &expected) {
            if value.as_bool() == Some(want) {
                self.pass(property, expected, value.to_string());
            } else {
                self.mismatch(property, &expected, value);
            }
        }
    }

    fn expect_int(&mut self, property: &str, want: i64) {
        let expected = want.to_string();
        if let Some(value) = self.lookup(property, &expected) {
            if value.as_int() == Some(want) {
                self.pass(property, expected, value.to_string());
            } else {
                self.mismatch(property, &expected, value);
            }
        }
    }

    /// Subset check: every required entry must appear in the reported list.
    /// The reported list may carry more; that is not a failure.
    fn expect_contains_all<I>(&mut self, property: &str, required: I)
    where
        I: IntoIterator<Item = &'static str>,
    {
        let required: Vec<&str> = required.into_iter().collect();
        let expected = format!("contains {{{}}}", required.join(", "));
        let Some(value) = self.lookup(property, &expected) else {
            return;
        };
        let Some(reported) = value.as_str_list() else {
            self.mismatch(property, &expected, value);
            return;
        };
        let missing: Vec<String> = required
            .iter()
            .filter(|r| !reported.iter().any(|have| have == *r))
            .map(|r| (*r).to_owned())
            .collect();
        let actual = format!("[{}]", reported.join(", "));
        if missing.is_empty() {
            self.pass(property, expected, actual);
        } else {
            let failure = Discrepancy::SetContainment {
                object: self.object,
                property: property.to_owned(),
                missing,
            };
            self.fail(property, expected, actual, failure);
        }
    }

    fn finish(self) -> Vec<CheckRecord> {
        self.checks
    }
}

/// Checks against the modem root object.
pub fn check_modem(snapshot: &PropertySnapshot, profile: &ExpectationProfile) -> Vec<CheckRecord> {
    let mut c = Checker::new(ObjectKind::Modem, snapshot);

    for property in profile.required_modem_properties {
        c.require_present(property);
    }

    c.expect_str("Type", profile.scalar.modem_type);
    c.expect_str("Manufacturer", profile.scalar.manufacturer);
    c.expect_str("Model", profile.scalar.model);
    c.expect_bool("Powered", profile.scalar.powered);
    c.expect_bool("Emergency", profile.scalar.emergency);
    c.expect_bool("Lockdown", profile.scalar.lockdown);
    c.expect_bool("Online", profile.scalar.online);

    // Serial is fixed on synthetic modems, merely non-empty elsewhere.
    match profile.scalar.identity {
        Some(identity) => c.expect_str("Serial", identity.serial),
        None => {
            if let Some(value) = c.lookup("Serial", "non-empty string") {
                match value.as_str() {
                    Some(s) if !s.is_empty() => {
                        let actual = value.to_string();
                        c.pass("Serial", "non-empty string", actual);
                    }
                    _ => c.mismatch("Serial", "non-empty string", value),
                }
            }
        }
    }

    c.expect_contains_all("Features", profile.required_features.iter().copied());
    c.expect_contains_all("Interfaces", profile.required_interfaces.iter().copied());

    c.finish()
}

/// Checks against the SimManager object.
pub fn check_sim(
    snapshot: &PropertySnapshot,
    profile: &ExpectationProfile,
    state: &ModemState,
    caller: &CallerExpectations,
) -> Vec<CheckRecord> {
    let mut c = Checker::new(ObjectKind::SimManager, snapshot);

    if !state.sim_present {
        // Only one thing to hold the daemon to here: no phantom SIM.
        c.expect_bool("Present", false);
        return c.finish();
    }

    for property in profile.required_sim_properties {
        c.require_present(property);
    }

    c.expect_bool("Present", true);
    c.expect_bool("FixedDialing", false);
    c.expect_bool("BarredDialing", false);
    c.expect_str("PinRequired", tables::EXPECTED_PIN_REQUIRED);

    // No PIN/PUK attempt has happened in a conformance run, so nothing may
    // be locked. Retries stays presence-only for the same reason.
    if let Some(value) = c.lookup("LockedPins", "[]") {
        match value.as_str_list() {
            Some([]) => c.pass("LockedPins", "[]", "[]"),
            _ => c.mismatch("LockedPins", "[]", value),
        }
    }

    if let Some(identity) = profile.scalar.identity {
        let expected = format!("[{}, ..]", identity.subscriber_number);
        if let Some(value) = c.lookup("SubscriberNumbers", &expected) {
            match value.as_str_list() {
                Some([first, ..]) if first == identity.subscriber_number => {
                    let actual = value.to_string();
                    c.pass("SubscriberNumbers", expected, actual);
                }
                _ => c.mismatch("SubscriberNumbers", &expected, value),
            }
        }
    }

    // Optional properties: asserted only when the daemon exposes the key
    // and an expected value exists for this variant.
    let identity = profile.scalar.identity;
    let optional: [(&str, Option<String>); 4] = [
        (
            "CardIdentifier",
            identity.map(|i| i.card_identifier.to_owned()),
        ),
        (
            "MobileCountryCode",
            identity
                .map(|i| i.mobile_country_code.to_owned())
                .or_else(|| caller.mcc.clone()),
        ),
        (
            "MobileNetworkCode",
            identity
                .map(|i| i.mobile_network_code.to_owned())
                .or_else(|| caller.mnc.clone()),
        ),
        (
            "SubscriberIdentity",
            identity
                .map(|i| i.subscriber_identity.to_owned())
                .or_else(|| caller.subscriber_identity.clone()),
        ),
    ];
    for (property, want) in optional {
        if let Some(want) = want {
            if snapshot.contains(property) {
                c.expect_str(property, &want);
            }
        }
    }

    c.finish()
}

/// Checks against the CallVolume object.
pub fn check_call_volume(
    snapshot: &PropertySnapshot,
    profile: &ExpectationProfile,
) -> Vec<CheckRecord> {
    let mut c = Checker::new(ObjectKind::CallVolume, snapshot);
    c.expect_int("MicrophoneVolume", 0);
    c.expect_int("SpeakerVolume", 0);
    c.expect_bool("Muted", profile.scalar.muted);
    c.finish()
}

/// Checks against the VoiceCallManager object: every reported emergency
/// number must belong to the fixed allow-list.
pub fn check_voice_calls(snapshot: &PropertySnapshot) -> Vec<CheckRecord> {
    let mut c = Checker::new(ObjectKind::VoiceCallManager, snapshot);
    let expected = format!("members of {{{}}}", tables::EMERGENCY_NUMBERS.join(", "));
    let Some(value) = c.lookup("EmergencyNumbers", &expected) else {
        return c.finish();
    };
    let Some(numbers) = value.as_str_list() else {
        c.mismatch("EmergencyNumbers", &expected, value);
        return c.finish();
    };
    let numbers = numbers.to_vec();
    let mut all_known = true;
    for number in &numbers {
        if !tables::EMERGENCY_NUMBERS.contains(&number.as_str()) {
            all_known = false;
            let failure = Discrepancy::ValueMismatch {
                object: ObjectKind::VoiceCallManager,
                property: "EmergencyNumbers".to_owned(),
                expected: expected.clone(),
                actual: number.clone(),
            };
            c.fail("EmergencyNumbers", expected.clone(), number.clone(), failure);
        }
    }
    if all_known {
        c.pass("EmergencyNumbers", expected, format!("[{}]", numbers.join(", ")));
    }
    c.finish()
}

/// Fetch one modem's snapshots, classify its state, and run every check.
///
/// A transport failure on any fetch aborts this path only; the caller
/// moves on to the next modem.
pub fn validate_modem(
    bus: &dyn ModemBus,
    path: &str,
    variant: &str,
    caller: &CallerExpectations,
) -> Result<ValidationReport, BusError> {
    let modem = bus.properties(path, ObjectKind::Modem)?;
    let sim = bus.properties(path, ObjectKind::SimManager)?;

    let online = modem
        .get("Online")
        .and_then(PropValue::as_bool)
        .unwrap_or(false);
    let sim_present = sim
        .get("Present")
        .and_then(PropValue::as_bool)
        .unwrap_or(false);
    let power = if online {
        PowerState::Online
    } else {
        PowerState::Offline
    };
    let state = ModemState::new(variant, power, sim_present);
    let profile = classify(&state);

    debug!(
        path,
        variant,
        power = %state.power,
        sim_present,
        features = profile.required_features.len(),
        interfaces = profile.required_interfaces.len(),
        "classified modem"
    );

    let mut checks = check_modem(&modem, &profile);
    checks.extend(check_sim(&sim, &profile, &state, caller));

    let volume = bus.properties(path, ObjectKind::CallVolume)?;
    checks.extend(check_call_volume(&volume, &profile));

    let voice = bus.properties(path, ObjectKind::VoiceCallManager)?;
    checks.extend(check_voice_calls(&voice));

    Ok(ValidationReport {
        modem_path: path.to_owned(),
        state,
        checks,
    })
}

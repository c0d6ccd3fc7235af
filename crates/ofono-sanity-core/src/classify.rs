//! State classifier — derives the expectation profile for one modem state.
//!
//! `classify` is a pure function of (variant, power, SIM presence): base
//! table lookup, then the variant's override row layered on top. No global
//! state, no ordering dependence between calls.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tables::{
    self, DeterministicIdentity, NO_SIM_OFFLINE_FEATURES, NO_SIM_OFFLINE_IFACES,
    NO_SIM_ONLINE_FEATURES, NO_SIM_ONLINE_IFACES, SIM_OFFLINE_FEATURES, SIM_OFFLINE_IFACES,
    SIM_ONLINE_FEATURES, SIM_ONLINE_IFACES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    Online,
    Offline,
}

impl PowerState {
    pub fn is_online(&self) -> bool {
        matches!(self, PowerState::Online)
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::Online => write!(f, "online"),
            PowerState::Offline => write!(f, "offline"),
        }
    }
}

/// One modem's runtime state, derived once per validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModemState {
    pub power: PowerState,
    pub sim_present: bool,
    pub variant: String,
}

impl ModemState {
    pub fn new(variant: impl Into<String>, power: PowerState, sim_present: bool) -> Self {
        Self {
            power,
            sim_present,
            variant: variant.into(),
        }
    }
}

/// Everything the validator will hold a modem to, for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationProfile {
    pub required_features: BTreeSet<&'static str>,
    pub required_interfaces: BTreeSet<&'static str>,
    pub required_modem_properties: &'static [&'static str],
    pub required_sim_properties: &'static [&'static str],
    pub scalar: ScalarExpectations,
}

/// Variant-aware scalar expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarExpectations {
    pub modem_type: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub powered: bool,
    pub emergency: bool,
    pub lockdown: bool,
    pub online: bool,
    pub muted: bool,
    /// Canned identity values when the variant's SIM is synthetic.
    pub identity: Option<&'static DeterministicIdentity>,
}

/// Derive the expectation profile for one modem state.
pub fn classify(state: &ModemState) -> ExpectationProfile {
    let online = state.power.is_online();
    let quirks = tables::variant_override(&state.variant);

    let base_features: &[&str] = match (online, state.sim_present) {
        (true, true) => SIM_ONLINE_FEATURES,
        (true, false) => NO_SIM_ONLINE_FEATURES,
        (false, true) => SIM_OFFLINE_FEATURES,
        (false, false) => NO_SIM_OFFLINE_FEATURES,
    };
    let base_interfaces: &[&str] = match (online, state.sim_present) {
        (true, true) => SIM_ONLINE_IFACES,
        (true, false) => NO_SIM_ONLINE_IFACES,
        (false, true) => SIM_OFFLINE_IFACES,
        (false, false) => NO_SIM_OFFLINE_IFACES,
    };

    let mut required_features: BTreeSet<&'static str> = base_features.iter().copied().collect();
    let mut required_interfaces: BTreeSet<&'static str> =
        base_interfaces.iter().copied().collect();

    if let Some(q) = quirks {
        if !online {
            if let Some(replacement) = q.offline_features {
                required_features = replacement.iter().copied().collect();
            }
            if let Some(replacement) = q.offline_interfaces {
                required_interfaces = replacement.iter().copied().collect();
            }
        } else {
            let extras = if state.sim_present {
                q.extra_online_sim_ifaces
            } else {
                q.extra_online_no_sim_ifaces
            };
            required_interfaces.extend(extras.iter().copied());
        }
    }

    ExpectationProfile {
        required_features,
        required_interfaces,
        required_modem_properties: tables::MODEM_PROPERTIES,
        required_sim_properties: tables::SIM_PROPERTIES,
        scalar: ScalarExpectations {
            modem_type: tables::EXPECTED_TYPE,
            manufacturer: tables::EXPECTED_MANUFACTURER,
            model: tables::EXPECTED_MODEL,
            powered: true,
            emergency: false,
            lockdown: false,
            online,
            muted: quirks.map_or(tables::DEFAULT_EXPECT_MUTED, |q| q.expect_muted),
            identity: tables::deterministic_identity(&state.variant),
        },
    }
}

//! Expectation tables — static data the classifier draws from.
//!
//! Base feature/interface sets are keyed by (power × SIM presence). Device
//! quirks live in [`VARIANT_OVERRIDES`], applied uniformly after the base
//! lookup; supporting a new hardware SKU means adding a row here, never
//! touching classifier control flow.

/// The emergency dialing code universe, independent of modem state.
pub const EMERGENCY_NUMBERS: &[&str] = &["08", "000", "999", "110", "112", "911", "118", "119"];

// ── Feature baselines ───────────────────────────────────────────────
//
// rilmodem doesn't remove "rat" when a modem is offlined, but the feature
// is also absent after booting offline, so neither offline baseline may
// assert it either way (LP: #1399756).

pub const NO_SIM_OFFLINE_FEATURES: &[&str] = &["sim"];
pub const SIM_OFFLINE_FEATURES: &[&str] = &["sim", "gprs", "sms"];
pub const NO_SIM_ONLINE_FEATURES: &[&str] = &["rat", "sim"];
pub const SIM_ONLINE_FEATURES: &[&str] = &["gprs", "ussd", "net", "sms", "rat", "sim"];

// ── Interface baselines ─────────────────────────────────────────────
//
// RadioSettings has the same offlining bug as "rat" above, so it appears
// in neither offline baseline.

pub const NO_SIM_OFFLINE_IFACES: &[&str] = &[
    "org.ofono.CallVolume",
    "org.ofono.VoiceCallManager",
    "org.ofono.SimManager",
];

pub const SIM_OFFLINE_IFACES: &[&str] = &[
    "org.ofono.ConnectionManager",
    "org.ofono.Phonebook",
    "org.ofono.CallForwarding",
    "org.ofono.SmartMessaging",
    "org.ofono.PushNotification",
    "org.ofono.MessageManager",
    "org.ofono.NetworkTime",
    "org.ofono.MessageWaiting",
    "org.ofono.SimManager",
    "org.ofono.CallVolume",
    "org.ofono.VoiceCallManager",
];

pub const NO_SIM_ONLINE_IFACES: &[&str] = &[
    "org.ofono.RadioSettings",
    "org.ofono.SimManager",
    "org.ofono.CallVolume",
    "org.ofono.VoiceCallManager",
];

pub const SIM_ONLINE_IFACES: &[&str] = &[
    "org.ofono.ConnectionManager",
    "org.ofono.CallBarring",
    "org.ofono.CallSettings",
    "org.ofono.SupplementaryServices",
    "org.ofono.NetworkRegistration",
    "org.ofono.Phonebook",
    "org.ofono.CallForwarding",
    "org.ofono.SmartMessaging",
    "org.ofono.PushNotification",
    "org.ofono.MessageManager",
    "org.ofono.NetworkTime",
    "org.ofono.MessageWaiting",
    "org.ofono.RadioSettings",
    "org.ofono.SimManager",
    "org.ofono.CallVolume",
    "org.ofono.VoiceCallManager",
];

// ── Required property keys ──────────────────────────────────────────

pub const MODEM_PROPERTIES: &[&str] = &[
    "Revision",
    "Serial",
    "Model",
    "Features",
    "Online",
    "Type",
    "Interfaces",
    "Emergency",
    "Manufacturer",
    "Powered",
    "Lockdown",
];

pub const SIM_PROPERTIES: &[&str] = &[
    "Present",
    "FixedDialing",
    "BarredDialing",
    "SubscriberNumbers",
    "LockedPins",
    "PinRequired",
    "Retries",
];

// ── Device-invariant scalar literals ────────────────────────────────

pub const EXPECTED_TYPE: &str = "hardware";
pub const EXPECTED_MANUFACTURER: &str = "Fake Manufacturer";
pub const EXPECTED_MODEL: &str = "Fake Modem Model";
pub const EXPECTED_PIN_REQUIRED: &str = "none";

// ── Variant override table ──────────────────────────────────────────

/// Quirk row for one device variant, layered on top of the base tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantOverride {
    pub variant: &'static str,
    /// Replaces the offline feature baseline (both SIM states) when set.
    pub offline_features: Option<&'static [&'static str]>,
    /// Replaces the offline interface baseline (both SIM states) when set.
    pub offline_interfaces: Option<&'static [&'static str]>,
    /// Appended to the online-with-SIM interface baseline.
    pub extra_online_sim_ifaces: &'static [&'static str],
    /// Appended to the online-without-SIM interface baseline.
    pub extra_online_no_sim_ifaces: &'static [&'static str],
    /// Expected CallVolume `Muted` value (LP: #1396317 differs per device).
    pub expect_muted: bool,
}

/// `Muted` reads back true everywhere the krillin bug doesn't apply.
pub const DEFAULT_EXPECT_MUTED: bool = true;

/// Known quirk rows.
///
/// krillin does not deterministically expose any features while offline,
/// makes no SIM/no-SIM distinction in its offline interfaces, and exposes
/// NetworkTime without a SIM (LP: #1399746) plus its vendor MtkSettings
/// interface whenever online.
pub const VARIANT_OVERRIDES: &[VariantOverride] = &[VariantOverride {
    variant: "krillin",
    offline_features: Some(&[]),
    offline_interfaces: Some(&[
        "org.ofono.CallVolume",
        "org.ofono.VoiceCallManager",
        "org.ofono.NetworkTime",
    ]),
    extra_online_sim_ifaces: &["org.ofono.MtkSettings"],
    extra_online_no_sim_ifaces: &["org.ofono.NetworkTime", "org.ofono.MtkSettings"],
    expect_muted: false,
}];

pub fn variant_override(variant: &str) -> Option<&'static VariantOverride> {
    VARIANT_OVERRIDES.iter().find(|o| o.variant == variant)
}

// ── Deterministic identity table ────────────────────────────────────

/// Fixed identity values for variants whose modem is fully synthetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicIdentity {
    pub variant: &'static str,
    pub serial: &'static str,
    pub subscriber_number: &'static str,
    pub card_identifier: &'static str,
    pub mobile_country_code: &'static str,
    pub mobile_network_code: &'static str,
    pub subscriber_identity: &'static str,
}

/// The Android emulator ("goldfish") is the only variant with a canned SIM.
pub const DETERMINISTIC_IDENTITIES: &[DeterministicIdentity] = &[DeterministicIdentity {
    variant: "goldfish",
    serial: "000000000000000",
    subscriber_number: "15555215554",
    card_identifier: "89014103211118510720",
    mobile_country_code: "310",
    mobile_network_code: "260",
    subscriber_identity: "310260000000000",
}];

pub fn deterministic_identity(variant: &str) -> Option<&'static DeterministicIdentity> {
    DETERMINISTIC_IDENTITIES.iter().find(|d| d.variant == variant)
}

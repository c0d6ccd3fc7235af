//! Property snapshots — the raw material every check runs against.
//!
//! oFono exposes each capability surface (Modem, SimManager, CallVolume,
//! VoiceCallManager) as a D-Bus interface with a `GetProperties` call
//! returning a string-keyed variant map. A [`PropertySnapshot`] is one such
//! map, fetched fresh per validation run and never cached across state
//! transitions.

use serde::{Deserialize, Serialize};

/// The oFono objects the oracle queries on a modem path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Modem,
    SimManager,
    CallVolume,
    VoiceCallManager,
}

impl ObjectKind {
    /// The D-Bus interface name used to fetch this object's properties.
    pub fn interface(&self) -> &'static str {
        match self {
            ObjectKind::Modem => "org.ofono.Modem",
            ObjectKind::SimManager => "org.ofono.SimManager",
            ObjectKind::CallVolume => "org.ofono.CallVolume",
            ObjectKind::VoiceCallManager => "org.ofono.VoiceCallManager",
        }
    }

    /// All queried objects, in validation order.
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Modem,
        ObjectKind::SimManager,
        ObjectKind::CallVolume,
        ObjectKind::VoiceCallManager,
    ];
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.interface())
    }
}

/// A property value as reported over the bus.
///
/// `Opaque` holds a debug rendering of anything outside the asserted value
/// model (e.g. the SimManager `Retries` byte-dict) so presence checks still
/// see the key even though no value check will ever match it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropValue {
    Str(String),
    Int(i64),
    Bool(bool),
    StrList(Vec<String>),
    Opaque(String),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            PropValue::StrList(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "{s:?}"),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::StrList(v) => write!(f, "[{}]", v.join(", ")),
            PropValue::Opaque(s) => write!(f, "<{s}>"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_owned())
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        PropValue::Int(i)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(v: Vec<String>) -> Self {
        PropValue::StrList(v)
    }
}

/// One object's property map, in bus arrival order.
///
/// Read-only once built; lookups are linear but the maps are a dozen keys
/// at most.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    entries: Vec<(String, PropValue)>,
}

impl PropertySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property. On duplicate names the first entry wins at lookup.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PropValue)> for PropertySnapshot {
    fn from_iter<T: IntoIterator<Item = (String, PropValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_pushed_values() {
        let mut snap = PropertySnapshot::new();
        snap.push("Powered", true);
        snap.push("Serial", "000000000000000");
        assert_eq!(snap.get("Powered").and_then(PropValue::as_bool), Some(true));
        assert_eq!(
            snap.get("Serial").and_then(|v| v.as_str()),
            Some("000000000000000")
        );
        assert!(snap.get("Missing").is_none());
    }

    #[test]
    fn order_is_preserved() {
        let mut snap = PropertySnapshot::new();
        snap.push("B", 1i64);
        snap.push("A", 2i64);
        let keys: Vec<_> = snap.keys().collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn object_kind_interface_names() {
        assert_eq!(ObjectKind::Modem.interface(), "org.ofono.Modem");
        assert_eq!(ObjectKind::SimManager.interface(), "org.ofono.SimManager");
    }
}

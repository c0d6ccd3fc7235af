//! Live system-bus client for `org.ofono`.
//!
//! Each property fetch is one blocking `GetProperties` round-trip against
//! the interface named by the object kind. Values outside the oracle's
//! asserted model come back as `PropValue::Opaque`.

use std::collections::BTreeMap;

use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use ofono_sanity_core::{BusError, ModemBus, ObjectKind, PropValue, PropertySnapshot};

const SERVICE: &str = "org.ofono";
const MANAGER_IFACE: &str = "org.ofono.Manager";

pub struct OfonoBus {
    conn: Connection,
}

impl OfonoBus {
    /// Connect to the system bus, where ofonod registers.
    pub fn system() -> Result<Self, BusError> {
        let conn = Connection::system().map_err(|e| BusError::Connect(e.to_string()))?;
        Ok(Self { conn })
    }

    fn proxy<'a>(&'a self, path: &'a str, interface: &'a str) -> Result<Proxy<'a>, BusError> {
        Proxy::new(&self.conn, SERVICE, path, interface)
            .map_err(|e| call_error(path, "Proxy::new", &e))
    }
}

impl ModemBus for OfonoBus {
    fn modem_paths(&self) -> Result<Vec<String>, BusError> {
        let proxy = self.proxy("/", MANAGER_IFACE)?;
        let modems: Vec<(OwnedObjectPath, BTreeMap<String, OwnedValue>)> = proxy
            .call("GetModems", &())
            .map_err(|e| call_error("/", "GetModems", &e))?;
        Ok(modems
            .into_iter()
            .map(|(path, _)| path.to_string())
            .collect())
    }

    fn properties(&self, path: &str, object: ObjectKind) -> Result<PropertySnapshot, BusError> {
        let proxy = self.proxy(path, object.interface())?;
        let props: BTreeMap<String, OwnedValue> = proxy
            .call("GetProperties", &())
            .map_err(|e| call_error(path, "GetProperties", &e))?;
        Ok(props
            .into_iter()
            .map(|(name, value)| (name, convert(&value)))
            .collect())
    }
}

fn call_error(path: &str, method: &str, err: &zbus::Error) -> BusError {
    BusError::Call {
        path: path.to_owned(),
        method: method.to_owned(),
        message: err.to_string(),
    }
}

/// Map a bus variant onto the oracle's value model.
fn convert(value: &Value<'_>) -> PropValue {
    match value {
        Value::Str(s) => PropValue::Str(s.as_str().to_owned()),
        Value::Bool(b) => PropValue::Bool(*b),
        Value::U8(n) => PropValue::Int(i64::from(*n)),
        Value::I16(n) => PropValue::Int(i64::from(*n)),
        Value::U16(n) => PropValue::Int(i64::from(*n)),
        Value::I32(n) => PropValue::Int(i64::from(*n)),
        Value::U32(n) => PropValue::Int(i64::from(*n)),
        Value::I64(n) => PropValue::Int(*n),
        Value::U64(n) => PropValue::Int(*n as i64),
        Value::ObjectPath(p) => PropValue::Str(p.as_str().to_owned()),
        Value::Array(array) => {
            let mut items = Vec::with_capacity(array.len());
            for item in array.iter() {
                match item {
                    Value::Str(s) => items.push(s.as_str().to_owned()),
                    // Mixed or non-string arrays (e.g. byte blobs) stay opaque.
                    _ => return PropValue::Opaque(format!("{value:?}")),
                }
            }
            PropValue::StrList(items)
        }
        Value::Value(inner) => convert(inner),
        other => PropValue::Opaque(format!("{other:?}")),
    }
}

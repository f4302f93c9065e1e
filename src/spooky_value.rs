use crate::error::RecordError;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

pub type FastMap<K, V> = BTreeMap<K, V>;

// ─── HostObject ─────────────────────────────────────────────────────────────

/// An object owned by the embedding host.
///
/// Record slots hold host objects through an `Arc`, so every slot is one
/// strong count that the record releases when it is dropped.
pub trait HostObject: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    /// Textual rendering used by record representation. May fail.
    fn repr(&self) -> Result<String, RecordError>;

    fn hash_value(&self) -> Result<u64, RecordError> {
        Err(RecordError::Unhashable("host object"))
    }
}

// ─── SpookyNumber ───────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub enum SpookyNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

/// Numeric equality: `I64(5) == U64(5) == F64(5.0)`, whatever the variant.
impl PartialEq for SpookyNumber {
    fn eq(&self, other: &Self) -> bool {
        use SpookyNumber::*;
        match (*self, *other) {
            (F64(a), F64(b)) => a == b,
            (F64(f), I64(i)) | (I64(i), F64(f)) => float_eq_int(f, i as i128),
            (F64(f), U64(u)) | (U64(u), F64(f)) => float_eq_int(f, u as i128),
            (a, b) => a.as_i128() == b.as_i128(),
        }
    }
}

#[inline]
fn float_eq_int(f: f64, n: i128) -> bool {
    // `as` saturates, so out-of-range floats never match an i64/u64
    f.fract() == 0.0 && f as i128 == n
}

impl std::fmt::Debug for SpookyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpookyNumber::I64(i) => write!(f, "I64({})", i),
            SpookyNumber::U64(u) => write!(f, "U64({})", u),
            SpookyNumber::F64(v) => write!(f, "F64({})", v),
        }
    }
}

impl SpookyNumber {
    #[inline]
    fn as_i128(self) -> Option<i128> {
        match self {
            SpookyNumber::I64(i) => Some(i as i128),
            SpookyNumber::U64(u) => Some(u as i128),
            SpookyNumber::F64(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            SpookyNumber::I64(i) => i as f64,
            SpookyNumber::U64(u) => u as f64,
            SpookyNumber::F64(f) => f,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            SpookyNumber::I64(i) => Some(i),
            SpookyNumber::U64(u) => i64::try_from(u).ok(),
            SpookyNumber::F64(f) => {
                // `MAX as f64` rounds up to a power of two that is already out of range
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            SpookyNumber::U64(u) => Some(u),
            SpookyNumber::I64(i) => u64::try_from(i).ok(),
            SpookyNumber::F64(f) => {
                if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }
}

// ─── SpookyValue ────────────────────────────────────────────────────────────

/// A value stored in a record slot. `Null` doubles as the placeholder for
/// hidden fields that were not supplied at construction.
#[derive(Debug, Clone, Default)]
pub enum SpookyValue {
    #[default]
    Null,
    Bool(bool),
    Number(SpookyNumber),
    Str(SmolStr),
    Array(Vec<SpookyValue>),
    Object(FastMap<SmolStr, SpookyValue>),
    Host(Arc<dyn HostObject>),
}

impl PartialEq for SpookyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SpookyValue::Null, SpookyValue::Null) => true,
            (SpookyValue::Bool(a), SpookyValue::Bool(b)) => a == b,
            (SpookyValue::Number(a), SpookyValue::Number(b)) => a == b,
            (SpookyValue::Str(a), SpookyValue::Str(b)) => a == b,
            (SpookyValue::Array(a), SpookyValue::Array(b)) => a == b,
            (SpookyValue::Object(a), SpookyValue::Object(b)) => a == b,
            // host objects compare by identity
            (SpookyValue::Host(a), SpookyValue::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl SpookyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpookyValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SpookyValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SpookyValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SpookyValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SpookyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FastMap<SmolStr, SpookyValue>> {
        match self {
            SpookyValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<SpookyValue>> {
        match self {
            SpookyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&Arc<dyn HostObject>> {
        match self {
            SpookyValue::Host(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&SpookyValue> {
        self.as_object()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SpookyValue::Null)
    }

    /// Host-facing kind name, used in type mismatch messages.
    pub fn kind(&self) -> &str {
        match self {
            SpookyValue::Null => "None",
            SpookyValue::Bool(_) => "bool",
            SpookyValue::Number(SpookyNumber::F64(_)) => "float",
            SpookyValue::Number(_) => "int",
            SpookyValue::Str(_) => "str",
            SpookyValue::Array(_) => "list",
            SpookyValue::Object(_) => "dict",
            SpookyValue::Host(obj) => obj.type_name(),
        }
    }

    /// Feed this value into `state`. Arrays and objects are mutable on the
    /// host side and therefore unhashable.
    pub fn hash_into<H: Hasher>(&self, state: &mut H) -> Result<(), RecordError> {
        match self {
            SpookyValue::Null => state.write_u8(0),
            SpookyValue::Bool(b) => {
                state.write_u8(1);
                state.write_u8(*b as u8);
            }
            SpookyValue::Number(n) => {
                state.write_u8(2);
                // equal numbers hash alike, whatever the variant
                match (n.as_i64(), n.as_u64()) {
                    (Some(i), _) => state.write_i64(i),
                    (None, Some(u)) => state.write_u64(u),
                    (None, None) => state.write_u64(n.as_f64().to_bits()),
                }
            }
            SpookyValue::Str(s) => {
                state.write_u8(3);
                state.write(s.as_bytes());
                state.write_u8(0xff);
            }
            SpookyValue::Array(_) => return Err(RecordError::Unhashable("list")),
            SpookyValue::Object(_) => return Err(RecordError::Unhashable("dict")),
            SpookyValue::Host(obj) => {
                state.write_u8(4);
                state.write_u64(obj.hash_value()?);
            }
        }
        Ok(())
    }
}

// ─── Serialize / Deserialize ────────────────────────────────────────────────

impl Serialize for SpookyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SpookyValue::Null => serializer.serialize_none(),
            SpookyValue::Bool(b) => serializer.serialize_bool(*b),
            SpookyValue::Number(n) => match n {
                SpookyNumber::I64(i) => serializer.serialize_i64(*i),
                SpookyNumber::U64(u) => serializer.serialize_u64(*u),
                SpookyNumber::F64(f) => serializer.serialize_f64(*f),
            },
            SpookyValue::Str(s) => serializer.serialize_str(s.as_str()),
            SpookyValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            SpookyValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
            SpookyValue::Host(obj) => Err(S::Error::custom(format!(
                "host object of type {} is not serializable",
                obj.type_name()
            ))),
        }
    }
}

struct SpookyValueVisitor;

impl<'de> Visitor<'de> for SpookyValueVisitor {
    type Value = SpookyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a plain data value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<SpookyValue, D::Error> {
        SpookyValue::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Number(SpookyNumber::I64(i)))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<SpookyValue, E> {
        // keep I64 for everything that fits so values compare equal after a round trip
        Ok(match i64::try_from(u) {
            Ok(i) => SpookyValue::Number(SpookyNumber::I64(i)),
            Err(_) => SpookyValue::Number(SpookyNumber::U64(u)),
        })
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Number(SpookyNumber::F64(f)))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Str(SmolStr::from(s)))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<SpookyValue, E> {
        Ok(SpookyValue::Str(SmolStr::from(s)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SpookyValue, A::Error> {
        let mut arr = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(v) = seq.next_element()? {
            arr.push(v);
        }
        Ok(SpookyValue::Array(arr))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SpookyValue, A::Error> {
        let mut obj = FastMap::new();
        while let Some((k, v)) = map.next_entry::<SmolStr, SpookyValue>()? {
            obj.insert(k, v);
        }
        Ok(SpookyValue::Object(obj))
    }
}

impl<'de> Deserialize<'de> for SpookyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SpookyValueVisitor)
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<f64> for SpookyValue {
    fn from(n: f64) -> Self {
        SpookyValue::Number(SpookyNumber::F64(n))
    }
}

impl From<i64> for SpookyValue {
    fn from(n: i64) -> Self {
        SpookyValue::Number(SpookyNumber::I64(n))
    }
}

impl From<u64> for SpookyValue {
    fn from(n: u64) -> Self {
        SpookyValue::Number(SpookyNumber::U64(n))
    }
}

impl From<bool> for SpookyValue {
    fn from(b: bool) -> Self {
        SpookyValue::Bool(b)
    }
}

impl From<&str> for SpookyValue {
    fn from(s: &str) -> Self {
        SpookyValue::Str(SmolStr::from(s))
    }
}

impl From<String> for SpookyValue {
    fn from(s: String) -> Self {
        SpookyValue::Str(SmolStr::from(s))
    }
}

impl From<Arc<dyn HostObject>> for SpookyValue {
    fn from(obj: Arc<dyn HostObject>) -> Self {
        SpookyValue::Host(obj)
    }
}

impl From<Vec<SpookyValue>> for SpookyValue {
    fn from(arr: Vec<SpookyValue>) -> Self {
        SpookyValue::Array(arr)
    }
}

// ─── From serde_json::Value ─────────────────────────────────────────────────

impl From<serde_json::Value> for SpookyValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => SpookyValue::Null,
            serde_json::Value::Bool(b) => SpookyValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SpookyValue::Number(SpookyNumber::I64(i))
                } else if let Some(u) = n.as_u64() {
                    SpookyValue::Number(SpookyNumber::U64(u))
                } else {
                    SpookyValue::Number(SpookyNumber::F64(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => SpookyValue::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                SpookyValue::Array(arr.into_iter().map(SpookyValue::from).collect())
            }
            serde_json::Value::Object(obj) => SpookyValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), SpookyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

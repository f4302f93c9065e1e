use super::construct::{FieldMap, construct};
use super::instance::RecordInstance;
use super::record_type::TypeRef;
use crate::error::RecordError;
use crate::spooky_value::{FastMap, SpookyValue};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

// ─── Reduction ──────────────────────────────────────────────────────────────

/// `(type, (visible, hidden))`: enough to rebuild an equal instance.
#[derive(Debug, Clone)]
pub struct Reduced {
    pub ty: TypeRef,
    pub visible: Vec<SpookyValue>,
    pub hidden: FastMap<SmolStr, SpookyValue>,
}

pub fn reduce(instance: &RecordInstance) -> Reduced {
    let ty = instance.record_type();
    let hidden = ty.fields[ty.n_visible()..]
        .iter()
        .zip(&instance.slots[ty.n_visible()..])
        .filter_map(|(spec, value)| {
            spec.name
                .as_str()
                .map(|name| (SmolStr::from(name), value.clone()))
        })
        .collect();
    Reduced {
        ty: ty.clone(),
        visible: instance.as_slice().to_vec(),
        hidden,
    }
}

impl Reduced {
    /// Rebuild the instance this was reduced from.
    pub fn reconstruct(self) -> Result<RecordInstance, RecordError> {
        construct(&self.ty, self.visible, Some(&self.hidden as &dyn FieldMap))
    }

    /// Portable form that names the type instead of holding it.
    pub fn into_record(self) -> ReducedRecord {
        ReducedRecord {
            type_name: self.ty.name.clone(),
            visible: self.visible,
            hidden: self.hidden,
        }
    }
}

impl RecordInstance {
    #[inline]
    pub fn reduce(&self) -> Reduced {
        reduce(self)
    }
}

// ─── Serialized form ────────────────────────────────────────────────────────

/// Reduced record as it goes over the wire. The type is resolved by name
/// through a [`TypeRegistry`](crate::registry::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedRecord {
    #[serde(rename = "type")]
    pub type_name: SmolStr,
    pub visible: Vec<SpookyValue>,
    #[serde(default)]
    pub hidden: FastMap<SmolStr, SpookyValue>,
}

impl ReducedRecord {
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, RecordError> {
        cbor4ii::serde::to_vec(Vec::new(), self)
            .map_err(|e| RecordError::Serialization(format!("CBOR encode: {e:?}")))
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, RecordError> {
        cbor4ii::serde::from_slice(bytes)
            .map_err(|e| RecordError::Serialization(format!("CBOR decode: {e:?}")))
    }
}

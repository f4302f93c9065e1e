use super::gc::InstanceId;
use super::instance::RecordInstance;
use super::record_type::TypeRef;
use crate::error::{ArityBound, RecordError};
use crate::spooky_value::{FastMap, SpookyValue};
use crate::types::{FieldName, FxMap};
use smol_str::SmolStr;
use tracing::trace;

// ─── FieldMap ───────────────────────────────────────────────────────────────

/// Supplemental name → value source for hidden fields.
///
/// `Ok(None)` means the name is absent. Any `Err` aborts construction and is
/// reported as a lookup failure for that field.
pub trait FieldMap {
    fn lookup(&self, name: &str) -> Result<Option<SpookyValue>, RecordError>;
}

impl FieldMap for FastMap<SmolStr, SpookyValue> {
    #[inline]
    fn lookup(&self, name: &str) -> Result<Option<SpookyValue>, RecordError> {
        Ok(self.get(name).cloned())
    }
}

impl FieldMap for FxMap<SmolStr, SpookyValue> {
    #[inline]
    fn lookup(&self, name: &str) -> Result<Option<SpookyValue>, RecordError> {
        Ok(self.get(name).cloned())
    }
}

impl FieldMap for serde_json::Map<String, serde_json::Value> {
    fn lookup(&self, name: &str) -> Result<Option<SpookyValue>, RecordError> {
        Ok(self.get(name).cloned().map(SpookyValue::from))
    }
}

// ─── Construction ───────────────────────────────────────────────────────────

fn check_arity(ty: &TypeRef, len: usize) -> Result<(), RecordError> {
    let (min_len, max_len) = (ty.n_visible(), ty.n_total());
    let bound = if min_len == max_len {
        (len != min_len).then_some(ArityBound::Exactly(min_len))
    } else if len < min_len {
        Some(ArityBound::AtLeast(min_len))
    } else if len > max_len {
        Some(ArityBound::AtMost(max_len))
    } else {
        None
    };
    match bound {
        Some(bound) => Err(RecordError::ArityMismatch {
            type_name: ty.name.clone(),
            bound,
            actual: len,
        }),
        None => Ok(()),
    }
}

/// Build an instance of `ty`.
///
/// The first `positional.len()` slots take ownership of `positional`; each
/// remaining slot is looked up by name in `map`, falling back to
/// `SpookyValue::Null`. Nothing is tracked or observable unless every slot
/// was filled.
pub fn construct(
    ty: &TypeRef,
    positional: Vec<SpookyValue>,
    map: Option<&dyn FieldMap>,
) -> Result<RecordInstance, RecordError> {
    let len = positional.len();
    check_arity(ty, len)?;

    let n_total = ty.n_total();
    let mut slots = positional;
    slots.try_reserve_exact(n_total - len)?;
    for spec in &ty.fields[len..] {
        let value = match (&spec.name, map) {
            (FieldName::Named(name), Some(map)) => map
                .lookup(name)
                .map_err(|e| lookup_failure(name, e))?
                .unwrap_or_default(),
            _ => SpookyValue::Null,
        };
        slots.push(value);
    }
    debug_assert_eq!(slots.len(), n_total);

    let instance = RecordInstance {
        ty: ty.clone(),
        id: InstanceId::next(),
        slots: slots.into_boxed_slice(),
    };
    ty.collector.track(instance.id);
    trace!(
        type_name = %ty.name(),
        id = instance.id.get(),
        supplied = len,
        "record constructed"
    );
    Ok(instance)
}

fn lookup_failure(field: &SmolStr, err: RecordError) -> RecordError {
    match err {
        e @ RecordError::LookupFailure { .. } => e,
        other => RecordError::LookupFailure {
            field: field.clone(),
            reason: other.to_string(),
        },
    }
}

/// Host-facing constructor taking loosely typed arguments: `sequence` must be
/// an array and `map`, when given, an object or null.
pub fn construct_from_value(
    ty: &TypeRef,
    sequence: &SpookyValue,
    map: Option<&SpookyValue>,
) -> Result<RecordInstance, RecordError> {
    let SpookyValue::Array(values) = sequence else {
        return Err(RecordError::TypeMismatch(format!(
            "constructor requires a sequence, got {}",
            sequence.kind()
        )));
    };
    let map: Option<&dyn FieldMap> = match map {
        None | Some(SpookyValue::Null) => None,
        Some(SpookyValue::Object(obj)) => Some(obj as &dyn FieldMap),
        Some(other) => {
            return Err(RecordError::TypeMismatch(format!(
                "{}() takes a dict as second arg, if any (got {})",
                ty.name(),
                other.kind()
            )));
        }
    };
    construct(ty, values.clone(), map)
}

use super::construct::construct;
use super::instance::RecordInstance;
use crate::error::RecordError;
use crate::spooky_value::{FastMap, SpookyValue};
use smol_str::SmolStr;

impl RecordInstance {
    /// Copy of this record with the named fields in `changes` overridden.
    ///
    /// Hidden fields may be replaced too. Types with unnamed fields cannot be
    /// addressed fully by name and are rejected.
    pub fn replace(
        &self,
        mut changes: FastMap<SmolStr, SpookyValue>,
    ) -> Result<RecordInstance, RecordError> {
        let ty = self.record_type();
        if ty.n_unnamed() > 0 {
            return Err(RecordError::TypeMismatch(format!(
                "replace() is not supported for {}: it has unnamed fields",
                ty.name()
            )));
        }

        let mut values = Vec::with_capacity(ty.n_total());
        for (spec, current) in ty.fields.iter().zip(self.slots.iter()) {
            let replacement = spec.name.as_str().and_then(|name| changes.remove(name));
            values.push(replacement.unwrap_or_else(|| current.clone()));
        }
        if !changes.is_empty() {
            let unknown: Vec<&str> = changes.keys().map(SmolStr::as_str).collect();
            return Err(RecordError::TypeMismatch(format!(
                "{}: unexpected field name(s): {}",
                ty.name(),
                unknown.join(", ")
            )));
        }
        construct(ty, values, None)
    }
}

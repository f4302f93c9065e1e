use super::gc::{InstanceId, Traceable, Traced};
use super::record_type::TypeRef;
use crate::error::RecordError;
use crate::spooky_value::SpookyValue;
use std::hash::Hasher;
use std::ops::{ControlFlow, Index};
use tracing::trace;
use xxhash_rust::xxh64::Xxh64;

// ─── RecordInstance ─────────────────────────────────────────────────────────

/// An immutable record. Owns exactly `n_total` values but behaves like a
/// sequence of its first `n_visible` values.
pub struct RecordInstance {
    pub(crate) ty: TypeRef,
    pub(crate) id: InstanceId,
    pub(crate) slots: Box<[SpookyValue]>,
}

impl RecordInstance {
    #[inline]
    pub fn record_type(&self) -> &TypeRef {
        &self.ty
    }

    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Positional length. Always `n_visible`, however many values were
    /// supplied at construction.
    #[inline]
    pub fn len(&self) -> usize {
        self.ty.n_visible
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ty.n_visible == 0
    }

    /// Positional access, restricted to the visible range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&SpookyValue> {
        self.as_slice().get(i)
    }

    /// Raw slot access over all `n_total` slots, hidden ones included.
    #[inline]
    pub fn get_by_index(&self, i: usize) -> Option<&SpookyValue> {
        self.slots.get(i)
    }

    /// Access any named field, visible or hidden.
    #[inline]
    pub fn get_by_name(&self, name: &str) -> Option<&SpookyValue> {
        self.ty.slot_of(name).map(|slot| &self.slots[slot])
    }

    /// The visible values in order.
    #[inline]
    pub fn as_slice(&self) -> &[SpookyValue] {
        &self.slots[..self.ty.n_visible]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SpookyValue> {
        self.as_slice().iter()
    }

    /// Hash of the visible values, in the same manner as a plain sequence of
    /// them. Fails when any visible value is unhashable.
    pub fn hash_value(&self) -> Result<u64, RecordError> {
        let mut hasher = Xxh64::new(0);
        hasher.write_usize(self.len());
        for value in self.iter() {
            value.hash_into(&mut hasher)?;
        }
        Ok(hasher.finish())
    }

    /// Explicitly release this instance. Equivalent to dropping it.
    pub fn dispose(self) {
        drop(self)
    }
}

impl Index<usize> for RecordInstance {
    type Output = SpookyValue;

    #[inline]
    fn index(&self, i: usize) -> &SpookyValue {
        &self.as_slice()[i]
    }
}

impl<'a> IntoIterator for &'a RecordInstance {
    type Item = &'a SpookyValue;
    type IntoIter = std::slice::Iter<'a, SpookyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequence equality: visible values only, like comparing two plain sequences.
impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl std::fmt::Debug for RecordInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordInstance")
            .field("type", &self.ty.name())
            .field("id", &self.id)
            .field("slots", &self.slots)
            .finish()
    }
}

// ─── Traversal & Disposal ───────────────────────────────────────────────────

impl Traceable for RecordInstance {
    fn traverse(&self, visit: &mut dyn FnMut(Traced<'_>) -> ControlFlow<()>) -> ControlFlow<()> {
        if let TypeRef::Heap(ty) = &self.ty {
            visit(Traced::Type(ty))?;
        }
        for value in self.slots.iter() {
            visit(Traced::Value(value))?;
        }
        ControlFlow::Continue(())
    }
}

impl Drop for RecordInstance {
    fn drop(&mut self) {
        self.ty.collector.untrack(self.id);
        let slots = std::mem::take(&mut self.slots).into_vec();
        let released = slots.len();
        for value in slots {
            drop(value);
        }
        trace!(
            type_name = %self.ty.name(),
            id = self.id.get(),
            released,
            "record disposed"
        );
        // `self.ty` drops after this, releasing the heap type reference.
    }
}

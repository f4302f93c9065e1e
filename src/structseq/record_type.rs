use super::gc::Collector;
use crate::types::{FieldInfo, FieldName, FieldSpec, FxMap};
use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

// ─── RecordType ─────────────────────────────────────────────────────────────

/// A built record type. Immutable once [`build_type`](super::build_type)
/// returns it; all counts and lookup tables are fixed at build time.
pub struct RecordType {
    pub(crate) name: SmolStr,
    pub(crate) doc: Option<SmolStr>,
    /// One entry per slot, `n_total` long.
    pub(crate) fields: Box<[FieldSpec]>,
    pub(crate) n_visible: usize,
    pub(crate) n_unnamed: usize,
    /// Every named field, visible or hidden.
    pub(crate) slots_by_name: FxMap<SmolStr, usize>,
    /// Visible field names in order, unnamed fields skipped.
    pub(crate) match_args: Box<[SmolStr]>,
    pub(crate) collector: Arc<dyn Collector>,
}

impl RecordType {
    /// Full type name as declared, e.g. `sys.version_info`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the module prefix.
    pub fn short_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((_, short)) => short,
            None => &self.name,
        }
    }

    /// Module prefix of a dotted type name, if any.
    pub fn module(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(module, _)| module)
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn n_visible(&self) -> usize {
        self.n_visible
    }

    #[inline]
    pub fn n_total(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn n_unnamed(&self) -> usize {
        self.n_unnamed
    }

    /// Whether the positional length may differ from `n_total`.
    #[inline]
    pub fn has_hidden_fields(&self) -> bool {
        self.n_visible != self.fields.len()
    }

    /// Ordered names usable for keyword-style reconstruction of the visible part.
    #[inline]
    pub fn match_args(&self) -> &[SmolStr] {
        &self.match_args
    }

    #[inline]
    pub fn field_name(&self, slot: usize) -> Option<&FieldName> {
        self.fields.get(slot).map(|f| &f.name)
    }

    #[inline]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots_by_name.get(name).copied()
    }

    /// Named fields in slot order.
    pub fn fields(&self) -> impl Iterator<Item = FieldInfo> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(move |(slot, spec)| match &spec.name {
                FieldName::Named(name) => Some(FieldInfo {
                    slot,
                    name: name.clone(),
                    doc: spec.doc.clone(),
                    visible: slot < self.n_visible,
                }),
                FieldName::Unnamed => None,
            })
    }

    /// Label used when rendering a slot. Unnamed slots get `_<slot>`.
    pub(crate) fn label(&self, slot: usize) -> Cow<'_, str> {
        match self.fields.get(slot).and_then(|f| f.name.as_str()) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("_{slot}")),
        }
    }

    /// Share this type through reference counting. Instances hold a strong
    /// reference to a heap type and report it during traversal.
    pub fn into_heap(self) -> TypeRef {
        TypeRef::Heap(Arc::new(self))
    }

    /// Pin this type for the rest of the process.
    pub fn leak(self) -> TypeRef {
        TypeRef::Static(Box::leak(Box::new(self)))
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("n_visible", &self.n_visible)
            .field("n_total", &self.fields.len())
            .field("n_unnamed", &self.n_unnamed)
            .finish_non_exhaustive()
    }
}

// ─── TypeRef ────────────────────────────────────────────────────────────────

/// Handle to a built type, either pinned for the process or reference counted.
#[derive(Clone)]
pub enum TypeRef {
    Static(&'static RecordType),
    Heap(Arc<RecordType>),
}

impl TypeRef {
    #[inline]
    pub fn is_heap(&self) -> bool {
        matches!(self, TypeRef::Heap(_))
    }

    #[inline]
    pub fn as_heap(&self) -> Option<&Arc<RecordType>> {
        match self {
            TypeRef::Heap(ty) => Some(ty),
            TypeRef::Static(_) => None,
        }
    }

    /// Identity comparison: two handles to the same built type.
    pub fn ptr_eq(&self, other: &TypeRef) -> bool {
        std::ptr::eq::<RecordType>(&**self, &**other)
    }
}

impl Deref for TypeRef {
    type Target = RecordType;

    #[inline]
    fn deref(&self) -> &RecordType {
        match self {
            TypeRef::Static(ty) => ty,
            TypeRef::Heap(ty) => ty,
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Static(ty) => write!(f, "Static({})", ty.name),
            TypeRef::Heap(ty) => write!(f, "Heap({})", ty.name),
        }
    }
}

use crate::structseq::gc::{Collector, NoopCollector};
use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub type FxMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

// ─── Field Descriptor Table ─────────────────────────────────────────────────

/// Name of a declared field. `Unnamed` fields have a position but no name
/// and may only appear in the visible range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    Named(SmolStr),
    Unnamed,
}

impl FieldName {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldName::Named(name) => Some(name.as_str()),
            FieldName::Unnamed => None,
        }
    }

    #[inline]
    pub fn is_unnamed(&self) -> bool {
        matches!(self, FieldName::Unnamed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: FieldName,
    pub doc: Option<SmolStr>,
}

impl FieldSpec {
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: FieldName::Named(name.into()),
            doc: None,
        }
    }

    pub fn unnamed() -> Self {
        Self {
            name: FieldName::Unnamed,
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<SmolStr>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// Everything needed to build a record type. Field position is declaration
/// order; the first `n_visible` fields form the positional view.
#[derive(Debug, Clone)]
pub struct RecordTypeDescriptor {
    pub name: SmolStr,
    pub doc: Option<SmolStr>,
    pub fields: Vec<FieldSpec>,
    pub n_visible: usize,
}

impl RecordTypeDescriptor {
    pub fn new(name: impl Into<SmolStr>, fields: Vec<FieldSpec>, n_visible: usize) -> Self {
        Self {
            name: name.into(),
            doc: None,
            fields,
            n_visible,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<SmolStr>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A named field as exposed by a built type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub slot: usize,
    pub name: SmolStr,
    pub doc: Option<SmolStr>,
    pub visible: bool,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Configuration for [`build_type_with`](crate::structseq::build_type_with).
#[derive(Clone)]
pub struct BuildConfig {
    /// Upper bound on `n_total`. Descriptors with more fields are rejected.
    ///
    /// Default: 256 fields.
    pub max_fields: NonZeroUsize,
    /// Collector that instances of the built type are tracked with.
    pub collector: Arc<dyn Collector>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_fields: NonZeroUsize::new(256).unwrap(),
            collector: Arc::new(NoopCollector),
        }
    }
}

impl std::fmt::Debug for BuildConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildConfig")
            .field("max_fields", &self.max_fields)
            .finish_non_exhaustive()
    }
}

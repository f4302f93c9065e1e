//! Immutable record types that behave like plain sequences of their visible
//! fields while also exposing every field, hidden ones included, by name.

pub mod error;
pub mod registry;
pub mod spooky_value;
pub mod structseq;
pub mod types;

pub use error::{ArityBound, RecordError};
pub use registry::TypeRegistry;
pub use spooky_value::{HostObject, SpookyNumber, SpookyValue};
pub use structseq::{
    RecordInstance, RecordType, Reduced, ReducedRecord, TypeRef, build_type, construct, reduce,
    repr,
};
pub use types::{BuildConfig, FieldName, FieldSpec, RecordTypeDescriptor};

#[cfg(test)]
pub(crate) mod test_support {
    /// Route `tracing` output through the test harness so log statements run
    /// under test. Safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }
}

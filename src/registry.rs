use crate::error::RecordError;
use crate::structseq::{FieldMap, RecordInstance, ReducedRecord, TypeRef, construct};
use crate::types::FxMap;
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::{debug, warn};

// ─── TypeRegistry ───────────────────────────────────────────────────────────

/// Name → type table used to resolve serialized records back to their type.
///
/// Registration is expected to happen once per type during startup.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxMap<SmolStr, TypeRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ty: TypeRef) -> Result<(), RecordError> {
        let name = SmolStr::from(ty.name());
        if self.types.contains_key(&name) {
            return Err(RecordError::AlreadyRegistered(name));
        }
        debug!(type_name = %name, heap = ty.is_heap(), "record type registered");
        self.types.insert(name, ty);
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Rebuild an instance from its serialized reduced form.
    pub fn reconstruct(&self, record: ReducedRecord) -> Result<RecordInstance, RecordError> {
        let ty = self
            .get(&record.type_name)
            .ok_or_else(|| RecordError::UnknownType(record.type_name.clone()))?;
        construct(ty, record.visible, Some(&record.hidden as &dyn FieldMap))
    }

    /// Remove a type from the registry.
    ///
    /// A heap type can only be torn down when the registry holds the last
    /// reference to it, i.e. no instance is alive.
    ///
    /// Static types are pinned for the process and their instances are not
    /// counted, so they are deregistered even while instances exist. Those
    /// instances keep working; only name resolution through this registry
    /// stops.
    pub fn teardown(&mut self, name: &str) -> Result<TypeRef, RecordError> {
        let ty = self
            .types
            .get(name)
            .ok_or_else(|| RecordError::UnknownType(SmolStr::from(name)))?;
        if let TypeRef::Heap(arc) = ty {
            let holders = Arc::strong_count(arc) - 1;
            if holders > 0 {
                warn!(type_name = name, holders, "refusing to tear down record type in use");
                return Err(RecordError::TypeInUse {
                    name: SmolStr::from(name),
                    holders,
                });
            }
        }
        debug!(type_name = name, "record type torn down");
        self.types
            .remove(name)
            .ok_or_else(|| RecordError::UnknownType(SmolStr::from(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spooky_value::{FastMap, SpookyValue};
    use crate::structseq::build_type;
    use crate::types::{FieldSpec, RecordTypeDescriptor};

    fn version_type() -> TypeRef {
        crate::test_support::init_tracing();
        let desc = RecordTypeDescriptor::new(
            "sys.version_info",
            vec![
                FieldSpec::named("major"),
                FieldSpec::named("minor"),
                FieldSpec::named("micro"),
                FieldSpec::named("releaselevel"),
                FieldSpec::named("serial"),
            ],
            5,
        );
        build_type(desc).unwrap().into_heap()
    }

    fn status_type() -> TypeRef {
        crate::test_support::init_tracing();
        let desc = RecordTypeDescriptor::new(
            "status",
            vec![
                FieldSpec::named("code"),
                FieldSpec::named("reason"),
                FieldSpec::named("detail"),
                FieldSpec::named("retry_after"),
            ],
            2,
        );
        build_type(desc).unwrap().into_heap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = TypeRegistry::new();
        registry.register(version_type()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("sys.version_info").unwrap().n_visible(), 5);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_duplicate_name_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(version_type()).unwrap();
        let err = registry.register(version_type()).unwrap_err();
        assert!(matches!(err, RecordError::AlreadyRegistered(name) if name == "sys.version_info"));
    }

    #[test]
    fn test_reconstruct_unknown_type() {
        let registry = TypeRegistry::new();
        let record = ReducedRecord {
            type_name: SmolStr::from("nope"),
            visible: vec![],
            hidden: FastMap::new(),
        };
        assert!(matches!(
            registry.reconstruct(record),
            Err(RecordError::UnknownType(_))
        ));
    }

    #[test]
    fn test_json_round_trip_through_registry() {
        let mut registry = TypeRegistry::new();
        registry.register(status_type()).unwrap();
        let ty = registry.get("status").unwrap().clone();

        let mut hidden = FastMap::new();
        hidden.insert(SmolStr::from("detail"), SpookyValue::from("upstream timed out"));
        let original = construct(
            &ty,
            vec![SpookyValue::from(503i64), SpookyValue::from("unavailable")],
            Some(&hidden),
        )
        .unwrap();

        let json = original.reduce().into_record().to_json().unwrap();
        let decoded = ReducedRecord::from_json(&json).unwrap();
        let rebuilt = registry.reconstruct(decoded).unwrap();

        assert_eq!(rebuilt, original);
        for name in ["code", "reason", "detail", "retry_after"] {
            assert_eq!(rebuilt.get_by_name(name), original.get_by_name(name), "{name}");
        }
        assert!(rebuilt.get_by_name("retry_after").unwrap().is_null());
    }

    #[test]
    fn test_json_round_trip_keeps_unsigned_values() {
        let mut registry = TypeRegistry::new();
        registry.register(status_type()).unwrap();
        let ty = registry.get("status").unwrap().clone();

        let mut hidden = FastMap::new();
        hidden.insert(SmolStr::from("retry_after"), SpookyValue::from(u64::MAX));
        let original = construct(
            &ty,
            vec![SpookyValue::from(429u64), SpookyValue::from("slow down")],
            Some(&hidden),
        )
        .unwrap();

        let json = original.reduce().into_record().to_json().unwrap();
        let rebuilt = registry
            .reconstruct(ReducedRecord::from_json(&json).unwrap())
            .unwrap();

        // small unsigned values come back as I64 and still compare equal
        assert_eq!(rebuilt, original);
        assert_eq!(rebuilt.hash_value().unwrap(), original.hash_value().unwrap());
        assert_eq!(rebuilt.get_by_name("code").and_then(SpookyValue::as_u64), Some(429));
        assert_eq!(
            rebuilt.get_by_name("retry_after").and_then(SpookyValue::as_u64),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_cbor_round_trip_through_registry() {
        let mut registry = TypeRegistry::new();
        registry.register(version_type()).unwrap();
        let ty = registry.get("sys.version_info").unwrap().clone();

        let original = construct(
            &ty,
            vec![
                SpookyValue::from(3i64),
                SpookyValue::from(12i64),
                SpookyValue::from(1i64),
                SpookyValue::from("final"),
                SpookyValue::from(0i64),
            ],
            None,
        )
        .unwrap();

        let bytes = original.reduce().into_record().to_cbor().unwrap();
        let rebuilt = registry
            .reconstruct(ReducedRecord::from_cbor(&bytes).unwrap())
            .unwrap();
        assert_eq!(rebuilt, original);
        assert!(rebuilt.record_type().ptr_eq(original.record_type()));
    }

    #[test]
    fn test_teardown_refused_while_instances_live() {
        let mut registry = TypeRegistry::new();
        registry.register(status_type()).unwrap();
        let ty = registry.get("status").unwrap().clone();
        let instance = construct(
            &ty,
            vec![SpookyValue::from(200i64), SpookyValue::from("ok")],
            None,
        )
        .unwrap();
        drop(ty);

        let err = registry.teardown("status").unwrap_err();
        assert!(matches!(err, RecordError::TypeInUse { holders: 1, .. }));

        drop(instance);
        let ty = registry.teardown("status").unwrap();
        assert_eq!(ty.name(), "status");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_teardown_static_type() {
        let mut registry = TypeRegistry::new();
        let desc = RecordTypeDescriptor::new("flags", vec![FieldSpec::named("debug")], 1);
        let ty = build_type(desc).unwrap().leak();
        registry.register(ty.clone()).unwrap();
        let _instance = construct(&ty, vec![SpookyValue::from(false)], None).unwrap();
        assert!(registry.teardown("flags").is_ok());
        assert!(matches!(
            registry.teardown("flags"),
            Err(RecordError::UnknownType(_))
        ));
    }
}

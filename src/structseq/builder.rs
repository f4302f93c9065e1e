use super::record_type::RecordType;
use crate::error::RecordError;
use crate::types::{BuildConfig, FieldName, FieldSpec, FxMap, RecordTypeDescriptor};
use smol_str::SmolStr;
use tracing::debug;

// ─── Type Builder ───────────────────────────────────────────────────────────

/// Build a record type with the default [`BuildConfig`].
pub fn build_type(descriptor: RecordTypeDescriptor) -> Result<RecordType, RecordError> {
    build_type_with(descriptor, &BuildConfig::default())
}

/// Validate `descriptor` and derive the immutable type tables.
///
/// Fails with `InvalidDescriptor` when an unnamed field sits outside the
/// visible range, when `n_visible` exceeds the field count, or when two
/// fields share a name.
pub fn build_type_with(
    descriptor: RecordTypeDescriptor,
    config: &BuildConfig,
) -> Result<RecordType, RecordError> {
    let RecordTypeDescriptor {
        name,
        doc,
        fields,
        n_visible,
    } = descriptor;

    let (n_total, n_unnamed) = count_fields(&name, &fields, n_visible)?;
    if n_total > config.max_fields.get() {
        return Err(RecordError::TooManyFields {
            limit: config.max_fields.get(),
            actual: n_total,
        });
    }

    let mut slots_by_name: FxMap<SmolStr, usize> = FxMap::default();
    slots_by_name
        .try_reserve(n_total - n_unnamed)
        .map_err(|_| RecordError::OutOfMemory("field name table"))?;
    let mut match_args: Vec<SmolStr> = Vec::new();
    match_args
        .try_reserve_exact(n_visible - n_unnamed)
        .map_err(|_| RecordError::OutOfMemory("match_args table"))?;

    for (slot, spec) in fields.iter().enumerate() {
        let FieldName::Named(field) = &spec.name else {
            continue;
        };
        if slots_by_name.insert(field.clone(), slot).is_some() {
            return Err(RecordError::InvalidDescriptor(format!(
                "{name}: duplicate field name '{field}'"
            )));
        }
        if slot < n_visible {
            match_args.push(field.clone());
        }
    }

    debug!(
        type_name = %name,
        n_visible,
        n_total,
        n_unnamed,
        "record type built"
    );

    Ok(RecordType {
        name,
        doc,
        fields: fields.into_boxed_slice(),
        n_visible,
        n_unnamed,
        slots_by_name,
        match_args: match_args.into_boxed_slice(),
        collector: config.collector.clone(),
    })
}

/// Returns `(n_total, n_unnamed)`.
fn count_fields(
    name: &str,
    fields: &[FieldSpec],
    n_visible: usize,
) -> Result<(usize, usize), RecordError> {
    let n_total = fields.len();
    if n_visible > n_total {
        return Err(RecordError::InvalidDescriptor(format!(
            "{name}: n_visible ({n_visible}) exceeds field count ({n_total})"
        )));
    }

    let mut n_unnamed = 0;
    for (slot, spec) in fields.iter().enumerate() {
        if !spec.name.is_unnamed() {
            continue;
        }
        if slot >= n_visible {
            return Err(RecordError::InvalidDescriptor(format!(
                "{name}: unnamed field at slot {slot} is outside the visible range (n_visible = {n_visible})"
            )));
        }
        n_unnamed += 1;
    }
    Ok((n_total, n_unnamed))
}

use criterion::{Criterion, criterion_group, criterion_main};
use smol_str::SmolStr;
use spooky_structseq::spooky_value::FastMap;
use spooky_structseq::{
    FieldSpec, RecordTypeDescriptor, SpookyValue, TypeRef, build_type, construct, repr,
};
use std::hint::black_box;

// ─── Test Data ──────────────────────────────────────────────────────────────

/// Shaped like a stat result: 10 visible fields (3 unnamed), 6 hidden ones.
fn make_stat_type() -> TypeRef {
    let mut fields: Vec<FieldSpec> = [
        "st_mode", "st_ino", "st_dev", "st_nlink", "st_uid", "st_gid", "st_size",
    ]
    .into_iter()
    .map(FieldSpec::named)
    .collect();
    fields.extend((0..3).map(|_| FieldSpec::unnamed()));
    fields.extend(
        [
            "st_atime",
            "st_mtime",
            "st_ctime",
            "st_atime_ns",
            "st_mtime_ns",
            "st_ctime_ns",
        ]
        .into_iter()
        .map(FieldSpec::named),
    );
    build_type(RecordTypeDescriptor::new("os.stat_result", fields, 10))
        .unwrap()
        .into_heap()
}

fn make_visible() -> Vec<SpookyValue> {
    (0..10i64).map(|i| SpookyValue::from(i * 1_000)).collect()
}

fn make_hidden() -> FastMap<SmolStr, SpookyValue> {
    let mut map = FastMap::new();
    map.insert(SmolStr::from("st_atime"), SpookyValue::from(1.5f64));
    map.insert(SmolStr::from("st_mtime_ns"), SpookyValue::from(1_500_000_000i64));
    map
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Construction
// ═══════════════════════════════════════════════════════════════════════════

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");
    let ty = make_stat_type();
    let hidden = make_hidden();

    group.bench_function("visible only", |b| {
        b.iter(|| construct(black_box(&ty), make_visible(), None).unwrap())
    });

    group.bench_function("with hidden map", |b| {
        b.iter(|| construct(black_box(&ty), make_visible(), Some(&hidden)).unwrap())
    });

    group.bench_function("build_type", |b| b.iter(make_stat_type));

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Access, repr, reduce
// ═══════════════════════════════════════════════════════════════════════════

fn bench_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("access");
    let ty = make_stat_type();
    let record = construct(&ty, make_visible(), Some(&make_hidden())).unwrap();

    group.bench_function("get_by_name (hidden)", |b| {
        b.iter(|| record.get_by_name(black_box("st_mtime_ns")))
    });

    group.bench_function("repr", |b| b.iter(|| repr(black_box(&record)).unwrap()));

    group.bench_function("reduce + reconstruct", |b| {
        b.iter(|| black_box(&record).reduce().reconstruct().unwrap())
    });

    group.bench_function("hash_value", |b| {
        b.iter(|| black_box(&record).hash_value().unwrap())
    });

    group.finish();
}

// ─── Criterion Main ─────────────────────────────────────────────────────────

criterion_group!(benches, bench_construct, bench_access);
criterion_main!(benches);

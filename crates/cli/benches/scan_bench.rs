use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use record::{ByteOrder, RecordWriter};
use scanner::{count_records, ScanOptions};
use tempfile::tempdir;
use verify::{check_order, ConsistencyChecker, VerifyConfig};

const N_RECORDS: i64 = 200_000;
const N_SHARDS: i64 = 8;

fn write_file(path: &std::path::Path, values: impl IntoIterator<Item = i64>) {
    let mut w = RecordWriter::create(path, ByteOrder::Little).unwrap();
    w.write_all(values).unwrap();
    w.finish().unwrap();
}

fn scan_count_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sorted_data.bin");
    write_file(&path, 0..N_RECORDS);

    for batch in [64usize, 4096] {
        let opts = ScanOptions {
            batch_records: batch,
            ..ScanOptions::default()
        };
        c.bench_function(&format!("count_200k_batch_{}", batch), |b| {
            b.iter(|| count_records(&path, &opts).unwrap());
        });
    }
}

fn order_check_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sorted_data.bin");
    write_file(&path, 0..N_RECORDS);
    let opts = ScanOptions::default();

    c.bench_function("order_check_200k_sorted", |b| {
        b.iter(|| check_order(&path, &opts).unwrap());
    });
}

fn full_verify_benchmark(c: &mut Criterion) {
    for jobs in [1usize, 4] {
        c.bench_function(&format!("verify_8_shards_jobs_{}", jobs), |b| {
            b.iter_batched(
                || {
                    let dir = tempdir().unwrap();
                    let per_shard = N_RECORDS / N_SHARDS;
                    let mut names = Vec::new();
                    for s in 0..N_SHARDS {
                        let name = format!("data_{}.bin", s);
                        let values = (0..per_shard).map(|i| i * N_SHARDS + s);
                        write_file(&dir.path().join(&name), values);
                        names.push(name);
                    }
                    std::fs::write(dir.path().join("names.txt"), names.join("\n")).unwrap();
                    write_file(&dir.path().join("sorted_data.bin"), 0..per_shard * N_SHARDS);
                    dir
                },
                |dir| {
                    let cfg = VerifyConfig::new(
                        dir.path().join("names.txt"),
                        dir.path().join("sorted_data.bin"),
                    )
                    .with_jobs(jobs);
                    let report = ConsistencyChecker::new(cfg).run().unwrap();
                    assert!(report.is_success());
                },
                BatchSize::PerIteration,
            );
        });
    }
}

criterion_group!(
    benches,
    scan_count_benchmark,
    order_check_benchmark,
    full_verify_benchmark
);
criterion_main!(benches);

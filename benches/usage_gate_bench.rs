// Usage gate benchmarks
//
// Cost of one admitted check against the file store, and of the
// in-memory record handling around it.

use chat_translate::models::UsageRecord;
use chat_translate::routes::translate::billable_length;
use chat_translate::services::{FileUsageStore, UsageGate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_file_gate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let gate = UsageGate::new(
        Box::new(FileUsageStore::new(dir.path().join("translation_usage.json"))),
        1 << 40,
    );

    c.bench_function("file_gate_check_and_update", |b| {
        b.to_async(&rt).iter(|| async {
            gate.check_and_update_usage(black_box(42))
                .await
                .expect("Usage check failed")
        });
    });
}

fn bench_record_handling(c: &mut Criterion) {
    let json = r#"{"currentMonth":"2024-01","totalCharacters":499990}"#;

    c.bench_function("usage_record_parse_and_roll", |b| {
        b.iter(|| {
            let mut record: UsageRecord =
                serde_json::from_str(black_box(json)).expect("Deserialization failed");
            record.roll_over(black_box("2024-02"));
            record.remaining(500_000)
        });
    });

    let message = "¿Dónde está la biblioteca? 📚 ".repeat(20);
    c.bench_function("billable_length", |b| {
        b.iter(|| billable_length(black_box(&message)));
    });
}

criterion_group!(benches, bench_file_gate, bench_record_handling);
criterion_main!(benches);

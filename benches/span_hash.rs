use std::time::{Duration, UNIX_EPOCH};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trace_model::{Flags, KeyValue, Log, Process, Span, SpanId, SpanRef, TraceId};

fn make_span(tags: usize) -> Span {
    let trace_id = TraceId {
        high: 0x58406520a0066491,
        low: 0x27e371903a2de979,
    };
    Span {
        trace_id,
        span_id: SpanId::from(0x4c721bf33e3caf8f),
        operation_name: "get-users".to_owned(),
        references: vec![SpanRef::child_of(trace_id, SpanId::from(0x68c4291c4954ae6f))],
        flags: Flags::new(1),
        start_time: UNIX_EPOCH + Duration::from_secs(1_485_467_191),
        duration: Duration::from_micros(5_000),
        tags: (0..tags)
            .map(|i| KeyValue::string(format!("tag-{i}"), "value"))
            .collect(),
        logs: vec![Log {
            timestamp: UNIX_EPOCH + Duration::from_secs(1_485_467_191),
            fields: vec![KeyValue::string("event", "baggage")],
        }],
        process: Some(Process {
            service_name: "user-service".to_owned(),
            tags: vec![KeyValue::string("hostname", "node-1")],
        }),
        warnings: Vec::new(),
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_hash");
    for tags in [1, 16] {
        let span = make_span(tags);
        group.bench_function(format!("tags_{tags}"), |b| {
            let mut buf = Vec::with_capacity(1024);
            b.iter(|| {
                buf.clear();
                black_box(&span).hash(&mut buf).unwrap();
                black_box(&buf);
            })
        });
    }
    group.finish();

    c.bench_function("trace_id_parse", |b| {
        b.iter(|| black_box("58406520a006649127e371903a2de979").parse::<TraceId>().unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

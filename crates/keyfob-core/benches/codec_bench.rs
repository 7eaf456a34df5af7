//! Criterion benchmarks for the bridge wire codec.
//!
//! A macro step costs one or two encoded reports; typing costs two per
//! character. These benchmarks keep an eye on per-report overhead.
//!
//! Run with:
//! ```bash
//! cargo bench --package keyfob-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyfob_core::protocol::codec::{decode_message, encode_message};
use keyfob_core::protocol::messages::{BridgeMessage, HelloMessage, PROTOCOL_VERSION};
use keyfob_core::{HidKey, KeyReport};
use uuid::Uuid;

fn make_report() -> BridgeMessage {
    BridgeMessage::Report(KeyReport::from_keys(&[
        HidKey::ControlLeft,
        HidKey::AltLeft,
        HidKey::Delete,
    ]))
}

fn make_hello() -> BridgeMessage {
    BridgeMessage::Hello(HelloMessage {
        appliance_id: Uuid::new_v4(),
        appliance_name: "bench-fob".to_string(),
        protocol_version: PROTOCOL_VERSION,
    })
}

fn bench_encode(c: &mut Criterion) {
    let report = make_report();
    let hello = make_hello();

    let mut group = c.benchmark_group("encode");
    group.bench_function("report", |b| {
        b.iter(|| encode_message(black_box(&report), black_box(1)))
    });
    group.bench_function("hello", |b| {
        b.iter(|| encode_message(black_box(&hello), black_box(1)))
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let report_bytes = encode_message(&make_report(), 1);
    let hello_bytes = encode_message(&make_hello(), 1);

    let mut group = c.benchmark_group("decode");
    group.bench_function("report", |b| {
        b.iter(|| decode_message(black_box(&report_bytes)))
    });
    group.bench_function("hello", |b| {
        b.iter(|| decode_message(black_box(&hello_bytes)))
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);

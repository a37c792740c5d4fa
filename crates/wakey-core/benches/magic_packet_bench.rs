//! Criterion benchmarks for MAC parsing and magic packet construction.
//!
//! Run with:
//! ```bash
//! cargo bench --package wakey-core --bench magic_packet_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wakey_core::{build_packet, MacAddress, MagicPacket};

/// Benchmarks MAC parsing for both delimiter styles.
fn bench_parse_mac(c: &mut Criterion) {
    let inputs: &[(&str, &str)] = &[
        ("colon", "AA:BB:CC:DD:EE:FF"),
        ("dash", "aa-bb-cc-dd-ee-ff"),
        ("invalid", "GG:11:22:33:44:55"),
    ];

    let mut group = c.benchmark_group("parse_mac");
    for (name, text) in inputs {
        group.bench_with_input(BenchmarkId::new("input", name), text, |b, text| {
            b.iter(|| MacAddress::parse(black_box(text)))
        });
    }
    group.finish();
}

/// Benchmarks encoding a pre-parsed packet and the full string-to-bytes path.
fn bench_build_packet(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_packet");

    let packet = MagicPacket::new(MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
    group.bench_function("to_bytes", |b| b.iter(|| black_box(&packet).to_bytes()));

    group.bench_function("from_str", |b| {
        b.iter(|| build_packet(black_box("AA:BB:CC:DD:EE:FF")).expect("valid mac"))
    });

    group.finish();
}

criterion_group!(benches, bench_parse_mac, bench_build_packet);
criterion_main!(benches);

//! Table of contents and member read benchmarks.
//!
//! Measures:
//! - Opening an archive (header, TOC inflation and XML parsing) as the
//!   member count grows
//! - Reading one member per data encoding, checksums verified

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::hint::black_box;
use std::io::Cursor;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use xarkit_core::XarArchive;
use xarkit_core::formats::Encoding;
use xarkit_core::test_utils::XarTestBuilder;

fn create_many_members(count: usize) -> Vec<u8> {
    (0..count)
        .fold(XarTestBuilder::new(), |builder, i| {
            builder.add_file(&format!("dir{}/file{i}.txt", i % 10), b"content")
        })
        .build()
}

fn benchmark_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_archive");

    for count in [10, 100, 1000] {
        let data = create_many_members(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter(|| {
                let archive = XarArchive::from_reader(Cursor::new(black_box(data))).unwrap();
                black_box(archive.members().len())
            });
        });
    }

    group.finish();
}

fn benchmark_read_member(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_member");
    let content = vec![b'x'; 256 * 1024];
    group.throughput(Throughput::Bytes(content.len() as u64));

    for encoding in [Encoding::OctetStream, Encoding::Gzip, Encoding::Bzip2] {
        let data = XarTestBuilder::new()
            .encoding(encoding.clone())
            .add_file("test.txt", &content)
            .build();
        group.bench_with_input(
            BenchmarkId::from_parameter(encoding.style()),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut archive = XarArchive::from_reader(Cursor::new(data)).unwrap();
                    black_box(archive.read_member_by_path("test.txt").unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_open, benchmark_read_member);
criterion_main!(benches);

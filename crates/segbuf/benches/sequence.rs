// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(missing_docs, reason = "Benchmark code")]

use std::alloc::System;
use std::hint::black_box;

use alloc_tracker::{Allocator, Session};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use segbuf::fixtures::{SequenceBuilder, TextFill};
use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, TraceOperations};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<System> = Allocator::system();

// Roughly the size of an HTTP request, split into chunks the size of small TCP segments.
const TEST_DATA_LEN: usize = 12345;
const MIN_CHUNK: usize = 100;
const MAX_CHUNK: usize = 1500;

fn entrypoint(c: &mut Criterion) {
    let allocs = Session::new();

    let mut test_data = vec![0_u8; TEST_DATA_LEN];
    TextFill::new()
        .fill(&mut test_data, 0, 100_000)
        .expect("bounds are a valid range");

    let split = SequenceBuilder::new()
        .split_random(test_data.as_slice(), MIN_CHUNK, MAX_CHUNK)
        .expect("test data and chunk sizes are valid");

    let mut group = c.benchmark_group("SegmentedSequence");

    let split_allocs = allocs.operation("split_random");
    group.bench_function("split_random", |b| {
        b.iter(|| {
            let _span = split_allocs.measure_thread();
            SequenceBuilder::new().split_random(black_box(test_data.as_slice()), MIN_CHUNK, MAX_CHUNK)
        });
    });

    group.bench_function("segments_sum", |b| {
        b.iter(|| {
            black_box(&split)
                .segments()
                .flatten()
                .fold(0_u64, |sum, byte| sum.wrapping_add(u64::from(*byte)))
        });
    });

    group.bench_function("get_each", |b| {
        b.iter(|| {
            let split = black_box(&split);
            (0..split.len()).step_by(97).filter_map(|i| split.get(i)).count()
        });
    });

    let to_vec_allocs = allocs.operation("to_vec");
    group.bench_function("to_vec", |b| {
        b.iter(|| {
            let _span = to_vec_allocs.measure_thread();
            black_box(&split).to_vec()
        });
    });

    group.bench_function("slice_middle", |b| {
        b.iter(|| black_box(&split).slice(TEST_DATA_LEN / 3, TEST_DATA_LEN / 3));
    });

    group.bench_function("reader_copy_to_slice", |b| {
        let mut target = vec![0_u8; TEST_DATA_LEN];
        b.iter(|| black_box(&split).reader().copy_to_slice(&mut target));
    });

    group.finish();

    let mut group = c.benchmark_group("BufferFacade");

    group.bench_function("write_read_direct", |b| {
        b.iter_batched_ref(
            || HeapBuffer::with_capacity(TEST_DATA_LEN),
            |buffer| {
                buffer.write_bytes(&test_data).expect("fits capacity");
                buffer.readable_sequence()
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("write_read_pass_through", |b| {
        b.iter_batched_ref(
            || BufferFacade::new(HeapBuffer::with_capacity(TEST_DATA_LEN)),
            |facade| {
                facade.write_bytes(&test_data).expect("fits capacity");
                facade.readable_sequence()
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("write_read_traced", |b| {
        b.iter_batched_ref(
            || BufferFacade::with_overrides(HeapBuffer::with_capacity(TEST_DATA_LEN), TraceOperations::default()),
            |facade| {
                facade.write_bytes(&test_data).expect("fits capacity");
                facade.readable_sequence()
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    allocs.print_to_stdout();
}

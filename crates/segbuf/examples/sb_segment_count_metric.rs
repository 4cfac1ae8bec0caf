// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Demonstrates how to manually extract the "how many segments in a `SegmentedSequence`" metric
//! from an app.
//!
//! This is for internal use only, to help fine-tune the inline segment capacity of chains.
//!
//! Reporting via metrics pipeline (e.g. OpenTelemetry) is also possible but out of scope here.

use nm::Report;
use segbuf::fixtures::SequenceBuilder;

fn main() {
    let builder = SequenceBuilder::new();

    // A single segment.
    let _sample1 = builder
        .compose_text(&["Hello, world!"])
        .expect("one input is a valid composition");

    // Four segments.
    let _sample4 = builder
        .compose_text(&["Hello", ", ", "world", "!"])
        .expect("four inputs are a valid composition");

    // Somewhere between 13 and 26 segments, depending on the seed.
    let _sample_split = builder
        .split_random(b"Hello, world! Hello, world!".as_slice(), 1, 2)
        .expect("non-empty input and valid chunk sizes");

    // Dump metrics to stdout.
    println!("{}", Report::collect());
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Deterministic test fixtures for code that consumes segmented data.
//!
//! Available with the `test-util` feature.

mod builder;
mod rng;
mod text;

pub use builder::{DEFAULT_SPLIT_SEED, SequenceBuilder};
pub use rng::SubtractiveRng;
pub use text::{DEFAULT_TEXT_SEED, TextFill};

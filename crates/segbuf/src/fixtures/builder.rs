// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use tracing::{Level, event};

use crate::fixtures::SubtractiveRng;
use crate::{ChainBuilder, Error, OwnedBlock, Result, SegmentedSequence};

/// The seed [`SequenceBuilder::new()`] uses for [`split_random()`][SequenceBuilder::split_random].
pub const DEFAULT_SPLIT_SEED: i32 = 0xFEED;

/// Every composed segment sits in a block this many times its own length.
const COMPOSE_BLOCK_FACTOR: usize = 8;

/// Builds [`SegmentedSequence`] fixtures that simulate fragmented memory layouts.
///
/// Code that parses or copies segmented data tends to have bugs at segment boundaries which
/// contiguous test inputs never reach. The builder turns flat test inputs into sequences with
/// many segments so that such code paths are exercised.
///
/// All layouts are deterministic: the same builder configuration and the same inputs produce
/// the same sequence shape on every run and platform.
///
/// ```
/// use segbuf::fixtures::SequenceBuilder;
///
/// let sequence = SequenceBuilder::new().split_random(b"Hello, world".as_slice(), 1, 3)?;
///
/// assert_eq!(sequence, b"Hello, world");
/// assert!(sequence.segment_count() >= 4);
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SequenceBuilder {
    seed: i32,
}

impl SequenceBuilder {
    /// Creates a builder that uses [`DEFAULT_SPLIT_SEED`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seed: DEFAULT_SPLIT_SEED,
        }
    }

    /// Replaces the seed that determines chunk sizes in [`split_random()`][Self::split_random].
    #[must_use]
    pub const fn with_seed(self, seed: i32) -> Self {
        Self { seed }
    }

    /// The seed that determines chunk sizes.
    #[must_use]
    pub const fn seed(&self) -> i32 {
        self.seed
    }

    /// Splits `data` into consecutive segments of pseudo-random size between `min_size` and
    /// `max_size` (both inclusive). The last segment may be shorter.
    ///
    /// All segments share a single block that takes ownership of `data`.
    ///
    /// Sizes are drawn with [`SubtractiveRng::next_in_range(min_size, max_size + 1)`][SubtractiveRng::next_in_range].
    /// .NET suites that split with `Random.Next(minSize, maxSize)` never produce `maxSize`, so the
    /// same seed yields different segment layouts here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `data` is empty, if `min_size` is zero, if
    /// `min_size` exceeds `max_size` or if `max_size` is not smaller than `i32::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if the generator draws a size outside `[min_size, max_size]`, which indicates a bug
    /// in the generator.
    pub fn split_random<T>(&self, data: impl Into<Arc<[T]>>, min_size: usize, max_size: usize) -> Result<SegmentedSequence<T>> {
        let block = OwnedBlock::new(data);

        if block.is_empty() {
            return Err(Error::invalid_configuration("cannot split an empty buffer"));
        }

        if min_size == 0 {
            return Err(Error::invalid_configuration("min_size must be at least 1"));
        }

        if min_size > max_size {
            return Err(Error::invalid_configuration(format!(
                "min_size {min_size} exceeds max_size {max_size}"
            )));
        }

        // The size is drawn from [min, max + 1), which must be representable as i32.
        let draw_max = i32::try_from(max_size)
            .ok()
            .and_then(|max| max.checked_add(1))
            .ok_or_else(|| Error::invalid_configuration(format!("max_size {max_size} must be smaller than {}", i32::MAX)))?;
        let draw_min = i32::try_from(min_size).expect("min_size <= max_size, which fits in i32");

        let len = block.len();
        let mut rng = SubtractiveRng::new(self.seed);
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(block);
        let mut offset = 0;

        while offset < len {
            let drawn = usize::try_from(rng.next_in_range(draw_min, draw_max)).expect("drawn sizes are at least min_size, so positive");
            let size = drawn.min(len - offset);

            builder.push(block, offset..offset + size)?;
            offset += size;
        }

        event!(
            Level::DEBUG,
            message = "split fixture built",
            seed = self.seed,
            len,
            segments = builder.node_count()
        );

        Ok(SegmentedSequence::from_chain(builder.build()?))
    }

    /// Concatenates `inputs` into one sequence with one segment per input, in input order.
    ///
    /// Each input is copied into its own block of eight times its length, starting at an offset
    /// equal to its length. Segments therefore never start at the beginning of their block and
    /// are followed by unused filler, which catches code that assumes segments span whole blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `inputs` is empty or an input is too large to
    /// allocate its block.
    pub fn compose<T: Clone + Default>(&self, inputs: &[&[T]]) -> Result<SegmentedSequence<T>> {
        if inputs.is_empty() {
            return Err(Error::invalid_configuration("at least one input is required"));
        }

        let mut builder = ChainBuilder::new();

        for input in inputs {
            let len = input.len();
            let block_len = len
                .checked_mul(COMPOSE_BLOCK_FACTOR)
                .ok_or_else(|| Error::invalid_configuration(format!("input of {len} elements is too large")))?;

            let mut storage = vec![T::default(); block_len];
            storage[len..len * 2].clone_from_slice(input);

            let block = builder.add_block(OwnedBlock::new(storage));
            builder.push(block, len..len * 2)?;
        }

        event!(
            Level::DEBUG,
            message = "composed fixture built",
            segments = builder.node_count()
        );

        Ok(SegmentedSequence::from_chain(builder.build()?))
    }

    /// Composes one default-valued segment per entry of `counts`, with the entry as its length.
    ///
    /// An empty `counts` yields an empty sequence with a single empty segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a count is too large to allocate its block.
    pub fn compose_counts<T: Clone + Default>(&self, counts: &[usize]) -> Result<SegmentedSequence<T>> {
        if counts.is_empty() {
            return Ok(SegmentedSequence::empty());
        }

        let inputs: Vec<Vec<T>> = counts.iter().map(|count| vec![T::default(); *count]).collect();
        let slices: Vec<&[T]> = inputs.iter().map(Vec::as_slice).collect();

        self.compose(&slices)
    }

    /// Composes one segment per string, holding its UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `inputs` is empty.
    pub fn compose_text(&self, inputs: &[&str]) -> Result<SegmentedSequence<u8>> {
        let slices: Vec<&[u8]> = inputs.iter().map(|text| text.as_bytes()).collect();

        self.compose(&slices)
    }
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

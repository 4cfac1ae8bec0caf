// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::chain::{NodeIndex, SegmentNode};
use crate::error::{Error, Result};
use crate::{SegmentedSequence, SequencePosition};

/// Consumes the elements of a [`SegmentedSequence`] front to back.
///
/// The reader holds its own clone of the sequence, so it can outlive the value it was created
/// from. Reading never modifies the sequence.
#[derive(Clone, Debug)]
pub struct SequenceReader<T> {
    sequence: SegmentedSequence<T>,

    /// Node the cursor is in. `None` once every segment has been exhausted.
    node: Option<NodeIndex>,

    /// Offset of the cursor relative to the start of the node's segment.
    offset: usize,

    remaining: usize,
}

impl<T> SequenceReader<T> {
    pub(crate) fn new(sequence: SegmentedSequence<T>) -> Self {
        let start = sequence.start();
        let remaining = sequence.len();

        let mut reader = Self {
            sequence,
            node: Some(start.node()),
            offset: start.offset(),
            remaining,
        };

        reader.skip_exhausted();
        reader
    }

    /// Number of elements not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every element has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// The unconsumed elements of the current segment.
    ///
    /// Empty only if the reader is empty.
    #[must_use]
    pub fn first_slice(&self) -> &[T] {
        let Some(node) = self.node else {
            return &[];
        };

        let bounds = self.sequence.bounds_of(node);

        self.sequence
            .chain_segment(node)
            .get(self.offset..bounds.end)
            .unwrap_or(&[])
    }

    /// Position of the next element to be consumed, or the end of the sequence if empty.
    #[must_use]
    pub fn position(&self) -> SequencePosition {
        self.node
            .map_or_else(|| self.sequence.end(), |node| SequencePosition::new(node, self.offset))
    }

    /// The unconsumed elements as a sequence sharing the same chain.
    ///
    /// # Panics
    ///
    /// Panics if the consumed count exceeds the length of the sequence, which indicates a bug in
    /// the reader.
    #[must_use]
    pub fn rest(&self) -> SegmentedSequence<T> {
        self.sequence
            .slice(self.sequence.len().wrapping_sub(self.remaining), self.remaining)
            .expect("the unconsumed range always lies within the sequence")
    }

    /// Consumes `count` elements without looking at them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if fewer than `count` elements remain. The reader is not
    /// moved in that case.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining {
            return Err(Error::out_of_bounds(
                "advance",
                self.sequence.len().wrapping_sub(self.remaining),
                count,
                self.sequence.len(),
            ));
        }

        let mut left = count;

        while left > 0 {
            let available = self.first_slice().len();
            let step = left.min(available);

            self.offset = self.offset.wrapping_add(step);
            self.remaining = self.remaining.wrapping_sub(step);
            left = left.wrapping_sub(step);

            self.skip_exhausted();
        }

        Ok(())
    }

    /// Moves the cursor past empty segments and fully consumed segments so that the current
    /// segment always has data unless the reader is empty.
    fn skip_exhausted(&mut self) {
        while let Some(node) = self.node {
            if self.offset < self.sequence.bounds_of(node).end {
                return;
            }

            if node == self.sequence.end().node() {
                self.node = None;
                return;
            }

            self.node = self.sequence.chain().node(node).and_then(SegmentNode::next);
            self.offset = 0;
        }
    }
}

impl<T: Copy> SequenceReader<T> {
    /// Fills `dst` with the next `dst.len()` elements, consuming them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if fewer than `dst.len()` elements remain. Neither the reader
    /// nor `dst` is modified in that case.
    pub fn copy_to_slice(&mut self, dst: &mut [T]) -> Result<()> {
        if dst.len() > self.remaining {
            return Err(Error::out_of_bounds(
                "copy_to_slice",
                self.sequence.len().wrapping_sub(self.remaining),
                dst.len(),
                self.sequence.len(),
            ));
        }

        let mut filled = 0;

        while filled < dst.len() {
            let source = self.first_slice();
            let step = source.len().min(dst.len().wrapping_sub(filled));

            let (Some(to), Some(from)) = (dst.get_mut(filled..filled.wrapping_add(step)), source.get(..step)) else {
                unreachable!("step is bounded by both the source and the destination");
            };
            to.copy_from_slice(from);

            filled = filled.wrapping_add(step);
            self.advance(step)?;
        }

        Ok(())
    }
}

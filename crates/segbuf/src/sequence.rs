// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

use nm::{Event, Magnitude};

use crate::chain::{NodeIndex, SegmentChain};
use crate::error::{Error, Result, check_range};
use crate::{ChainBuilder, OwnedBlock, SequenceReader};

/// A location inside a segment chain: a node plus an offset relative to the start of that
/// node's segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SequencePosition {
    node: NodeIndex,
    offset: usize,
}

impl SequencePosition {
    /// Creates a position `offset` elements into the segment of `node`.
    #[must_use]
    pub const fn new(node: NodeIndex, offset: usize) -> Self {
        Self { node, offset }
    }

    /// The node the position is in.
    #[must_use]
    pub const fn node(&self) -> NodeIndex {
        self.node
    }

    /// The offset from the start of the node's segment.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// An immutable logical run of elements spanning one or more segments of a [`SegmentChain`].
///
/// The sequence starts at a position in its first node and ends at a position in its last node.
/// Every node between them contributes its entire segment. The elements of a sequence are not
/// required to be consecutive in memory and segments may start at any offset inside the memory
/// block backing them.
///
/// Cloning a sequence is cheap and shares the chain. Sequences are `Send + Sync` and may be read
/// from any number of threads because nothing about them changes after construction.
///
/// ```
/// use segbuf::{ChainBuilder, OwnedBlock, SegmentedSequence};
///
/// let mut builder = ChainBuilder::new();
/// let first = builder.add_block(OwnedBlock::new(*b"..Hello"));
/// let second = builder.add_block(OwnedBlock::new(*b", world.."));
/// builder.push(first, 2..7)?;
/// builder.push(second, 0..7)?;
///
/// let sequence = SegmentedSequence::from_chain(builder.build()?);
///
/// let mut text = Vec::new();
/// for segment in sequence.segments() {
///     text.extend_from_slice(segment);
/// }
///
/// assert_eq!(text, b"Hello, world");
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Debug)]
pub struct SegmentedSequence<T> {
    chain: Arc<SegmentChain<T>>,
    start: SequencePosition,
    end: SequencePosition,

    /// We cache the length and segment count so we do not have to walk the chain every time.
    len: usize,
    segment_count: usize,
}

impl<T> SegmentedSequence<T> {
    /// Creates a sequence over a chain, from `start` (inclusive) to `end` (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if either position refers to a node outside the chain or an
    /// offset beyond the end of its node's segment.
    ///
    /// Returns [`Error::InvalidConfiguration`] if `end` is not reachable from `start` by following
    /// the chain or lies before `start` within the same node.
    ///
    /// # Panics
    ///
    /// Panics if the segments between `start` and `end` add up to more than `usize::MAX` elements.
    pub fn new(chain: impl Into<Arc<SegmentChain<T>>>, start: SequencePosition, end: SequencePosition) -> Result<Self> {
        let chain = chain.into();

        for position in [start, end] {
            let node = chain
                .node(position.node)
                .ok_or_else(|| Error::out_of_bounds("sequence position", position.node.get(), 1, chain.node_count()))?;

            check_range("sequence position", position.offset, 0, node.len())?;
        }

        if start.node == end.node && start.offset > end.offset {
            return Err(Error::invalid_configuration("sequence end lies before its start"));
        }

        let mut len: usize = 0;
        let mut segment_count: usize = 0;
        let mut current = Some(start.node);

        while let Some(index) = current {
            let node = chain.node_at(index);
            let from = if index == start.node { start.offset } else { 0 };
            let to = if index == end.node { end.offset } else { node.len() };

            len = len
                .checked_add(to.wrapping_sub(from))
                .expect("a chain cannot reference more elements than fit in memory");
            segment_count = segment_count.wrapping_add(1);

            if index == end.node {
                return Ok(Self::from_parts(chain, start, end, len, segment_count));
            }

            current = node.next();
        }

        Err(Error::invalid_configuration("sequence end is not reachable from its start"))
    }

    /// Creates a sequence covering every segment of a chain in full.
    #[must_use]
    pub fn from_chain(chain: impl Into<Arc<SegmentChain<T>>>) -> Self {
        let chain = chain.into();

        let start = SequencePosition::new(chain.first(), 0);
        let last = chain.last();
        let end = SequencePosition::new(last, chain.node_at(last).len());

        // Chains link their nodes in append order, so every node lies between first and last.
        let len = (0..chain.node_count())
            .map(|i| chain.node_at(NodeIndex(i)).len())
            .sum();
        let segment_count = chain.node_count();

        Self::from_parts(chain, start, end, len, segment_count)
    }

    /// A sequence of zero elements, consisting of a single empty segment.
    ///
    /// # Panics
    ///
    /// Panics if a chain with one empty segment cannot be built, which indicates a bug in
    /// [`ChainBuilder`].
    #[must_use]
    pub fn empty() -> Self {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(OwnedBlock::new(Vec::new()));
        builder.push(block, 0..0).expect("empty range always fits an empty block");

        Self::from_chain(builder.build().expect("chain has one segment"))
    }

    fn from_parts(chain: Arc<SegmentChain<T>>, start: SequencePosition, end: SequencePosition, len: usize, segment_count: usize) -> Self {
        // We can use this to fine-tune the inline segment count once we have real-world data.
        SEQUENCE_CREATED_SEGMENTS.with(|x| x.observe(segment_count));

        Self {
            chain,
            start,
            end,
            len,
            segment_count,
        }
    }

    /// Number of elements in the sequence.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence has zero elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments the sequence spans, including empty ones.
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Whether all elements of the sequence are in one segment.
    #[must_use]
    pub const fn is_single_segment(&self) -> bool {
        self.segment_count == 1
    }

    /// Position of the first element.
    #[must_use]
    pub const fn start(&self) -> SequencePosition {
        self.start
    }

    /// Position one past the last element.
    #[must_use]
    pub const fn end(&self) -> SequencePosition {
        self.end
    }

    /// The chain the sequence reads from.
    #[must_use]
    pub fn chain(&self) -> &SegmentChain<T> {
        &self.chain
    }

    /// Iterates over the segments of the sequence in order, trimmed to the sequence bounds.
    ///
    /// Empty segments are yielded as empty slices.
    pub fn segments(&self) -> Segments<'_, T> {
        Segments {
            sequence: self,
            next: Some(self.start.node),
            remaining: self.segment_count,
        }
    }

    /// The elements of the first segment.
    #[must_use]
    pub fn first_segment(&self) -> &[T] {
        self.segments().next().unwrap_or(&[])
    }

    /// Translates a logical index into a position in the chain.
    ///
    /// An `index` equal to the length maps to [`end()`][Self::end].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` is greater than the length.
    pub fn position(&self, index: usize) -> Result<SequencePosition> {
        check_range("position", index, 0, self.len)?;

        if index == self.len {
            return Ok(self.end);
        }

        let mut remaining = index;

        for (node, bounds) in self.segment_bounds() {
            let segment_len = bounds.len();

            if remaining < segment_len {
                return Ok(SequencePosition::new(node, bounds.start.wrapping_add(remaining)));
            }

            remaining = remaining.wrapping_sub(segment_len);
        }

        unreachable!("index was checked to be within the sequence length")
    }

    /// References the element at `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let position = self.position(index).ok()?;
        self.chain.segment_at(position.node).get(position.offset)
    }

    /// Returns a sub-sequence of `count` elements starting at logical `index`.
    ///
    /// This is a zero-copy operation; the result shares the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the range does not lie within the sequence.
    pub fn slice(&self, index: usize, count: usize) -> Result<Self> {
        check_range("slice", index, count, self.len)?;

        let start = self.position(index)?;

        if count == 0 {
            return Ok(Self::from_parts(Arc::clone(&self.chain), start, start, 0, 1));
        }

        // The end is placed in the node holding the last element, not at the start of the next.
        let last = self.position(index.wrapping_add(count).wrapping_sub(1))?;
        let end = SequencePosition::new(last.node, last.offset.wrapping_add(1));

        Self::new(Arc::clone(&self.chain), start, end)
    }

    /// Creates a consuming reader over the sequence.
    ///
    /// The reader shares the chain; reading from it does not affect this sequence.
    #[must_use]
    pub fn reader(&self) -> SequenceReader<T> {
        SequenceReader::new(self.clone())
    }

    /// Iterates over each node of the sequence together with its offsets relative to the node.
    pub(crate) fn segment_bounds(&self) -> impl Iterator<Item = (NodeIndex, Range<usize>)> + '_ {
        let mut current = Some(self.start.node);
        let mut remaining = self.segment_count;

        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }

            let index = current?;
            remaining = remaining.wrapping_sub(1);
            current = self.chain.node_at(index).next();

            Some((index, self.bounds_of(index)))
        })
    }

    /// Offsets of the part of a node's segment that belongs to the sequence.
    pub(crate) fn bounds_of(&self, index: NodeIndex) -> Range<usize> {
        let from = if index == self.start.node { self.start.offset } else { 0 };
        let to = if index == self.end.node {
            self.end.offset
        } else {
            self.chain.node_at(index).len()
        };

        from..to
    }

    pub(crate) fn chain_segment(&self, index: NodeIndex) -> &[T] {
        self.chain.segment_at(index)
    }
}

impl<T: Copy> SegmentedSequence<T> {
    /// Copies elements starting at logical `index` into `dst`, filling it completely.
    ///
    /// Returns the number of elements copied, which is always `dst.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the sequence does not have `dst.len()` elements after `index`.
    pub fn copy_to_slice(&self, index: usize, dst: &mut [T]) -> Result<usize> {
        check_range("copy_to_slice", index, dst.len(), self.len)?;

        let mut reader = self.reader();
        reader.advance(index)?;
        reader.copy_to_slice(dst)?;

        Ok(dst.len())
    }
}

impl<T: Clone> SegmentedSequence<T> {
    /// Copies the elements of the sequence into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.len);

        for segment in self.segments() {
            result.extend_from_slice(segment);
        }

        result
    }
}

impl<T> Clone for SegmentedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            start: self.start,
            end: self.end,
            len: self.len,
            segment_count: self.segment_count,
        }
    }
}

impl<T> Default for SegmentedSequence<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: PartialEq> PartialEq for SegmentedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        // We do not care about the structure, only the contents.
        self.len == other.len && self.segments().flatten().eq(other.segments().flatten())
    }
}

impl<T: Eq> Eq for SegmentedSequence<T> {}

impl<T: PartialEq> PartialEq<[T]> for SegmentedSequence<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len == other.len() && self.segments().flatten().eq(other.iter())
    }
}

impl<T: PartialEq> PartialEq<&[T]> for SegmentedSequence<T> {
    fn eq(&self, other: &&[T]) -> bool {
        self.eq(*other)
    }
}

impl<T: PartialEq, const LEN: usize> PartialEq<&[T; LEN]> for SegmentedSequence<T> {
    fn eq(&self, other: &&[T; LEN]) -> bool {
        self.eq(other.as_slice())
    }
}

/// Iterator over the segments of a [`SegmentedSequence`], in chain order.
///
/// Returned by [`SegmentedSequence::segments()`].
#[derive(Debug)]
#[must_use]
pub struct Segments<'s, T> {
    sequence: &'s SegmentedSequence<T>,
    next: Option<NodeIndex>,
    remaining: usize,
}

impl<'s, T> Iterator for Segments<'s, T> {
    type Item = &'s [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.next?;
        self.remaining = self.remaining.wrapping_sub(1);
        self.next = self.sequence.chain.node_at(index).next();

        let sequence: &'s SegmentedSequence<T> = self.sequence;
        sequence.chain_segment(index).get(sequence.bounds_of(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Segments<'_, T> {}

impl<T> FusedIterator for Segments<'_, T> {}

const SEGMENT_COUNT_BUCKETS: &[Magnitude] = &[0, 1, 2, 4, 8, 16, 32];

thread_local! {
    static SEQUENCE_CREATED_SEGMENTS: Event = Event::builder()
        .name("segbuf_sequence_created_segments")
        .histogram(SEGMENT_COUNT_BUCKETS)
        .build();
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ErrorKind;

    assert_impl_all!(SegmentedSequence<u8>: Send, Sync, Clone);

    /// "Hello" + "" + ", wor" + "ld" stored at various offsets of separate blocks.
    fn hello_world() -> SegmentedSequence<u8> {
        let mut builder = ChainBuilder::new();
        let a = builder.add_block(OwnedBlock::new(*b"xxHelloxx"));
        let b = builder.add_block(OwnedBlock::new(*b"zz"));
        let c = builder.add_block(OwnedBlock::new(*b"x, world"));

        builder.push(a, 2..7).unwrap();
        builder.push(b, 1..1).unwrap();
        builder.push(c, 1..6).unwrap();
        builder.push(c, 6..8).unwrap();

        SegmentedSequence::from_chain(builder.build().unwrap())
    }

    #[test]
    fn from_chain_covers_everything() {
        let sequence = hello_world();

        assert_eq!(sequence.len(), 12);
        assert_eq!(sequence.segment_count(), 4);
        assert!(!sequence.is_single_segment());
        assert_eq!(sequence, b"Hello, world");
        assert_eq!(sequence.first_segment(), b"Hello");

        let lengths: Vec<_> = sequence.segments().map(<[u8]>::len).collect();
        assert_eq!(lengths, vec![5, 0, 5, 2]);
        assert_eq!(sequence.segments().len(), 4);
    }

    #[test]
    fn new_with_partial_first_and_last() {
        let full = hello_world();
        let chain = Arc::clone(&full.chain);

        let sequence =
            SegmentedSequence::new(chain, SequencePosition::new(NodeIndex(0), 1), SequencePosition::new(NodeIndex(2), 3)).unwrap();

        assert_eq!(sequence.len(), 7);
        assert_eq!(sequence.segment_count(), 3);
        assert_eq!(sequence.to_vec(), b"ello, w");
    }

    #[test]
    fn new_within_single_node() {
        let full = hello_world();

        let sequence = SegmentedSequence::new(
            Arc::clone(&full.chain),
            SequencePosition::new(NodeIndex(0), 1),
            SequencePosition::new(NodeIndex(0), 4),
        )
        .unwrap();

        assert!(sequence.is_single_segment());
        assert_eq!(sequence, b"ell");
    }

    #[test]
    fn new_rejects_invalid_positions() {
        let full = hello_world();
        let chain = || Arc::clone(&full.chain);

        let err = SegmentedSequence::new(chain(), SequencePosition::new(NodeIndex(9), 0), full.end()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);

        let err = SegmentedSequence::new(chain(), SequencePosition::new(NodeIndex(0), 6), full.end()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);

        // End before start in the same node.
        let err = SegmentedSequence::new(
            chain(),
            SequencePosition::new(NodeIndex(0), 3),
            SequencePosition::new(NodeIndex(0), 2),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

        // End node precedes start node, so it is never reached.
        let err = SegmentedSequence::new(
            chain(),
            SequencePosition::new(NodeIndex(2), 0),
            SequencePosition::new(NodeIndex(0), 2),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn empty_sequence() {
        let sequence = SegmentedSequence::<u8>::empty();

        assert!(sequence.is_empty());
        assert_eq!(sequence.segment_count(), 1);
        assert_eq!(sequence.first_segment(), b"");
        assert_eq!(sequence, SegmentedSequence::default());
        assert!(sequence.get(0).is_none());
    }

    #[test]
    fn random_access() {
        let sequence = hello_world();
        let expected = b"Hello, world";

        for (i, byte) in expected.iter().enumerate() {
            assert_eq!(sequence.get(i), Some(byte));
        }

        assert!(sequence.get(12).is_none());
    }

    #[test]
    fn position_skips_empty_and_exhausted_segments() {
        let sequence = hello_world();

        assert_eq!(sequence.position(0).unwrap(), SequencePosition::new(NodeIndex(0), 0));
        assert_eq!(sequence.position(4).unwrap(), SequencePosition::new(NodeIndex(0), 4));
        // Index 5 is the first byte of the third segment, the empty one is skipped.
        assert_eq!(sequence.position(5).unwrap(), SequencePosition::new(NodeIndex(2), 0));
        assert_eq!(sequence.position(10).unwrap(), SequencePosition::new(NodeIndex(3), 0));
        assert_eq!(sequence.position(12).unwrap(), sequence.end());
        assert_eq!(sequence.end(), SequencePosition::new(NodeIndex(3), 2));
        assert_eq!(sequence.position(13).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn slice_across_segments() {
        let sequence = hello_world();

        let slice = sequence.slice(3, 6).unwrap();
        assert_eq!(slice, b"lo, wo");
        assert_eq!(slice.segment_count(), 3);

        let tail = sequence.slice(10, 2).unwrap();
        assert_eq!(tail, b"ld");
        assert!(tail.is_single_segment());

        let exact_segment = sequence.slice(0, 5).unwrap();
        assert_eq!(exact_segment, b"Hello");
        assert!(exact_segment.is_single_segment());

        assert_eq!(sequence.slice(0, 12).unwrap(), sequence);
    }

    #[test]
    fn slice_empty_and_oob() {
        let sequence = hello_world();

        assert!(sequence.slice(4, 0).unwrap().is_empty());
        assert!(sequence.slice(12, 0).unwrap().is_empty());
        assert_eq!(sequence.slice(8, 5).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(sequence.slice(13, 0).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn copy_to_slice_from_offset() {
        let sequence = hello_world();

        let mut dst = [0_u8; 7];
        assert_eq!(sequence.copy_to_slice(4, &mut dst).unwrap(), 7);
        assert_eq!(&dst, b"o, worl");

        let mut too_long = [0_u8; 3];
        assert_eq!(sequence.copy_to_slice(10, &mut too_long).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(too_long, [0, 0, 0]);
    }

    #[test]
    fn eq_ignores_structure() {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(OwnedBlock::new(*b"Hello, world"));
        builder.push(block, 0..12).unwrap();
        let contiguous = SegmentedSequence::from_chain(builder.build().unwrap());

        assert_eq!(contiguous, hello_world());
        assert_ne!(contiguous.slice(0, 11).unwrap(), hello_world());
        assert_eq!(hello_world(), b"Hello, world".as_slice());
    }

    #[test]
    fn shared_across_threads() {
        let sequence = hello_world();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sequence = sequence.clone();
                thread::spawn(move || sequence.to_vec())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), b"Hello, world");
        }
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ops::Range;

use smallvec::SmallVec;

use crate::error::{Error, Result, check_range};
use crate::{MAX_INLINE_SEGMENTS, OwnedBlock};

/// Identifies a [`SegmentNode`] within its [`SegmentChain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// Position of the node in the chain's arena.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Identifies an [`OwnedBlock`] registered with a [`ChainBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockIndex(usize);

/// One link of a segment chain: a range of elements inside one memory block.
///
/// The range is fixed once the node has been pushed into a chain. Only the [`ChainBuilder`]
/// sets the link to the next node, and only while appending its successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentNode {
    block: BlockIndex,
    start: usize,
    end: usize,
    next: Option<NodeIndex>,
}

impl SegmentNode {
    /// Offset of the first element of the segment within its memory block.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last element of the segment within its memory block.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of elements in the segment.
    #[must_use]
    pub const fn len(&self) -> usize {
        // Cannot underflow, `push()` validates start <= end.
        self.end.wrapping_sub(self.start)
    }

    /// Whether the segment references zero elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The node that follows this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<NodeIndex> {
        self.next
    }
}

/// An immutable, non-empty, singly linked chain of segments over owned memory blocks.
///
/// Nodes live in an arena and link to each other by index. Every node links to a node that was
/// appended after it, so traversal always moves forward and the chain cannot contain cycles.
///
/// Chains are created via [`ChainBuilder`] and read via [`SegmentedSequence`][crate::SegmentedSequence].
#[derive(Debug)]
pub struct SegmentChain<T> {
    blocks: SmallVec<[OwnedBlock<T>; MAX_INLINE_SEGMENTS]>,
    nodes: SmallVec<[SegmentNode; MAX_INLINE_SEGMENTS]>,
}

impl<T> SegmentChain<T> {
    /// The head of the chain.
    #[must_use]
    pub const fn first(&self) -> NodeIndex {
        NodeIndex(0)
    }

    /// The tail of the chain.
    #[must_use]
    pub fn last(&self) -> NodeIndex {
        // Chains are never empty, enforced by `ChainBuilder::build()`.
        NodeIndex(self.nodes.len().wrapping_sub(1))
    }

    /// Number of nodes in the chain.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node by index, returning `None` if it does not belong to this chain.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&SegmentNode> {
        self.nodes.get(index.0)
    }

    /// The memory block a node references.
    #[must_use]
    pub fn block(&self, index: NodeIndex) -> Option<&OwnedBlock<T>> {
        self.node(index).and_then(|node| self.blocks.get(node.block.0))
    }

    /// The elements referenced by a node, or `None` if the node does not belong to this chain.
    #[must_use]
    pub fn segment(&self, index: NodeIndex) -> Option<&[T]> {
        let node = self.node(index)?;
        let block = self.blocks.get(node.block.0)?;

        block.as_slice().get(node.start..node.end)
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> &SegmentNode {
        self.node(index).expect("node index originates from this chain")
    }

    pub(crate) fn segment_at(&self, index: NodeIndex) -> &[T] {
        self.segment(index).expect("node index originates from this chain")
    }
}

/// Assembles a [`SegmentChain`] in append order.
///
/// Blocks are registered first and then any number of segments are pushed over ranges of the
/// registered blocks. Each pushed segment becomes the successor of the previously pushed one.
///
/// ```
/// use segbuf::{ChainBuilder, OwnedBlock, SegmentedSequence};
///
/// let mut builder = ChainBuilder::new();
/// let block = builder.add_block(OwnedBlock::new(*b"Hello, world"));
/// builder.push(block, 0..5)?;
/// builder.push(block, 5..12)?;
///
/// let sequence = SegmentedSequence::from_chain(builder.build()?);
/// assert_eq!(sequence.segment_count(), 2);
/// assert_eq!(sequence, b"Hello, world");
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Debug)]
pub struct ChainBuilder<T> {
    blocks: SmallVec<[OwnedBlock<T>; MAX_INLINE_SEGMENTS]>,
    nodes: SmallVec<[SegmentNode; MAX_INLINE_SEGMENTS]>,
}

impl<T> ChainBuilder<T> {
    /// Creates a builder without any blocks or segments.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: SmallVec::new_const(),
            nodes: SmallVec::new_const(),
        }
    }

    /// Registers a memory block that segments can subsequently reference.
    pub fn add_block(&mut self, block: OwnedBlock<T>) -> BlockIndex {
        let index = BlockIndex(self.blocks.len());
        self.blocks.push(block);
        index
    }

    /// Appends a segment over `range` of a registered block, linking it after the current tail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the block is not registered with this builder or the
    /// range does not lie within the block.
    pub fn push(&mut self, block: BlockIndex, range: Range<usize>) -> Result<NodeIndex> {
        let block_len = self
            .blocks
            .get(block.0)
            .map(OwnedBlock::len)
            .ok_or_else(|| Error::out_of_bounds("push segment", block.0, 1, self.blocks.len()))?;

        let count = range.end.checked_sub(range.start).unwrap_or(usize::MAX);
        check_range("push segment", range.start, count, block_len)?;

        let index = NodeIndex(self.nodes.len());

        if let Some(tail) = self.nodes.last_mut() {
            tail.next = Some(index);
        }

        self.nodes.push(SegmentNode {
            block,
            start: range.start,
            end: range.end,
            next: None,
        });

        Ok(index)
    }

    /// Number of segments pushed so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Completes the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no segment was pushed.
    pub fn build(self) -> Result<SegmentChain<T>> {
        if self.nodes.is_empty() {
            return Err(Error::invalid_configuration("a segment chain requires at least one segment"));
        }

        Ok(SegmentChain {
            blocks: self.blocks,
            nodes: self.nodes,
        })
    }
}

impl<T> Default for ChainBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ErrorKind;

    assert_impl_all!(SegmentChain<u8>: Send, Sync);

    #[test]
    fn push_links_in_append_order() {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(OwnedBlock::new(vec![0_u8; 10]));

        let a = builder.push(block, 0..3).unwrap();
        let b = builder.push(block, 3..3).unwrap();
        let c = builder.push(block, 3..10).unwrap();

        let chain = builder.build().unwrap();

        assert_eq!(chain.node_count(), 3);
        assert_eq!(chain.first(), a);
        assert_eq!(chain.last(), c);
        assert_eq!(chain.node(a).unwrap().next(), Some(b));
        assert_eq!(chain.node(b).unwrap().next(), Some(c));
        assert_eq!(chain.node(c).unwrap().next(), None);
        assert!(chain.node(b).unwrap().is_empty());
        assert_eq!(chain.node(c).unwrap().len(), 7);
    }

    #[test]
    fn segments_reference_their_block_ranges() {
        let mut builder = ChainBuilder::new();
        let first = builder.add_block(OwnedBlock::new(*b"abcdef"));
        let second = builder.add_block(OwnedBlock::new(*b"uvwxyz"));

        let a = builder.push(first, 2..4).unwrap();
        let b = builder.push(second, 1..6).unwrap();

        let chain = builder.build().unwrap();

        assert_eq!(chain.segment(a).unwrap(), b"cd");
        assert_eq!(chain.segment(b).unwrap(), b"vwxyz");
        assert_eq!(chain.block(b).unwrap().as_slice(), b"uvwxyz");
        assert_eq!(chain.node(a).unwrap().start(), 2);
        assert_eq!(chain.node(a).unwrap().end(), 4);
    }

    #[test]
    fn push_rejects_out_of_block_range() {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(OwnedBlock::new(vec![0_u8; 4]));

        assert_eq!(builder.push(block, 2..5).unwrap_err().kind(), ErrorKind::OutOfBounds);

        #[expect(clippy::reversed_empty_ranges, reason = "testing inverted range rejection")]
        let inverted = 3..2;
        assert_eq!(builder.push(block, inverted).unwrap_err().kind(), ErrorKind::OutOfBounds);

        // Nothing was linked by the failed pushes.
        assert_eq!(builder.node_count(), 0);
    }

    #[test]
    fn push_rejects_foreign_block() {
        let mut other = ChainBuilder::new();
        other.add_block(OwnedBlock::new(vec![0_u8; 4]));
        let foreign = other.add_block(OwnedBlock::new(vec![0_u8; 4]));

        let mut builder = ChainBuilder::<u8>::new();
        assert_eq!(builder.push(foreign, 0..1).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn empty_chain_is_invalid() {
        let builder = ChainBuilder::<u8>::new();
        assert_eq!(builder.build().unwrap_err().kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn lookup_outside_chain_is_none() {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(OwnedBlock::new(vec![1_u8]));
        builder.push(block, 0..1).unwrap();
        let chain = builder.build().unwrap();

        assert!(chain.node(NodeIndex(1)).is_none());
        assert!(chain.segment(NodeIndex(1)).is_none());
        assert!(chain.block(NodeIndex(7)).is_none());
    }
}

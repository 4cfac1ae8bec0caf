// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ops::Range;

use tracing::{Level, event};

use crate::error::{Error, Result, check_range};
use crate::{ByteBuffer, ChainBuilder, DEFAULT_MAX_CAPACITY, OwnedBlock, SegmentedSequence};

/// The smallest capacity a buffer grows to once it needs to grow at all.
const MIN_GROWTH_CAPACITY: usize = 64;

/// A contiguous [`ByteBuffer`] backed by a single heap-allocated [`OwnedBlock`].
///
/// Segmented views of the readable bytes are zero-copy: the returned sequence shares the block
/// with the buffer. If the buffer is written to while such a sequence is alive, the buffer first
/// moves to a private copy of the block, so the sequence keeps observing the bytes it was
/// created over.
///
/// When a write does not fit, the capacity is doubled (starting at 64 bytes) until it does,
/// but never beyond [`max_capacity()`][ByteBuffer::max_capacity].
///
/// ```
/// use segbuf::{ByteBuffer, HeapBuffer};
///
/// let mut buffer = HeapBuffer::with_capacity(8);
/// buffer.write_bytes(b"Hello, ")?.write_bytes(b"world")?;
///
/// let sequence = buffer.readable_sequence();
/// buffer.advance(7)?;
///
/// assert_eq!(buffer.readable(), b"world");
/// assert_eq!(sequence, b"Hello, world");
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct HeapBuffer {
    block: OwnedBlock<u8>,
    reader: usize,
    writer: usize,
    max_capacity: usize,
}

impl HeapBuffer {
    /// Creates a zero-filled buffer of `initial_capacity` bytes that may grow up to `max_capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `initial_capacity` exceeds `max_capacity`.
    pub fn new(initial_capacity: usize, max_capacity: usize) -> Result<Self> {
        if initial_capacity > max_capacity {
            return Err(Error::invalid_configuration(format!(
                "initial capacity {initial_capacity} exceeds maximum capacity {max_capacity}"
            )));
        }

        Ok(Self {
            block: OwnedBlock::with_len(initial_capacity),
            reader: 0,
            writer: 0,
            max_capacity,
        })
    }

    /// Creates a zero-filled buffer of `capacity` bytes with the default maximum capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            block: OwnedBlock::with_len(capacity),
            reader: 0,
            writer: 0,
            max_capacity: DEFAULT_MAX_CAPACITY.max(capacity),
        }
    }

    /// Creates a buffer whose readable bytes are a copy of `bytes` and that has no free space.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            block: OwnedBlock::new(bytes),
            reader: 0,
            writer: bytes.len(),
            max_capacity: DEFAULT_MAX_CAPACITY.max(bytes.len()),
        }
    }

    fn sequence_over(&self, range: Range<usize>) -> SegmentedSequence<u8> {
        let mut builder = ChainBuilder::new();
        let block = builder.add_block(self.block.clone());
        builder
            .push(block, range)
            .expect("callers only pass ranges within the capacity");

        SegmentedSequence::from_chain(builder.build().expect("chain has one segment"))
    }

    fn ensure_writable(&mut self, count: usize) -> Result<()> {
        if count <= self.writable_len() {
            return Ok(());
        }

        let required = self
            .writer
            .checked_add(count)
            .filter(|required| *required <= self.max_capacity)
            .ok_or_else(|| Error::out_of_bounds("grow", self.writer, count, self.max_capacity))?;

        let mut new_capacity = self.capacity().max(MIN_GROWTH_CAPACITY);
        while new_capacity < required {
            new_capacity = new_capacity.saturating_mul(2);
        }
        let new_capacity = new_capacity.min(self.max_capacity);

        let mut storage = vec![0_u8; new_capacity];
        storage[..self.capacity()].copy_from_slice(self.block.as_slice());

        event!(
            Level::TRACE,
            message = "growing heap buffer",
            old_capacity = self.capacity(),
            new_capacity
        );

        self.block = OwnedBlock::new(storage);
        Ok(())
    }
}

impl Default for HeapBuffer {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ByteBuffer for HeapBuffer {
    fn capacity(&self) -> usize {
        self.block.len()
    }

    fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    fn reader_index(&self) -> usize {
        self.reader
    }

    fn writer_index(&self) -> usize {
        self.writer
    }

    fn readable(&self) -> &[u8] {
        &self.block.as_slice()[self.reader..self.writer]
    }

    fn readable_at(&self, index: usize, count: usize) -> Result<&[u8]> {
        check_range("readable_at", index, count, self.writer)?;

        self.block.range(index..index.wrapping_add(count))
    }

    fn readable_sequence(&self) -> SegmentedSequence<u8> {
        self.sequence_over(self.reader..self.writer)
    }

    fn readable_sequence_at(&self, index: usize, count: usize) -> Result<SegmentedSequence<u8>> {
        check_range("readable_sequence_at", index, count, self.writer)?;

        Ok(self.sequence_over(index..index.wrapping_add(count)))
    }

    fn advance(&mut self, count: usize) -> Result<()> {
        check_range("advance", self.reader, count, self.writer)?;

        self.reader = self.reader.wrapping_add(count);
        Ok(())
    }

    fn commit(&mut self, count: usize) -> Result<()> {
        check_range("commit", self.writer, count, self.capacity())?;

        self.writer = self.writer.wrapping_add(count);
        Ok(())
    }

    fn free(&mut self) -> &mut [u8] {
        let writer = self.writer;
        &mut self.block.make_mut()[writer..]
    }

    fn free_with_hint(&mut self, size_hint: usize) -> Result<&mut [u8]> {
        self.ensure_writable(size_hint)?;

        Ok(self.free())
    }

    fn free_at(&mut self, index: usize, count: usize) -> Result<&mut [u8]> {
        check_range("free_at", index, count, self.capacity())?;

        Ok(&mut self.block.make_mut()[index..index.wrapping_add(count)])
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<usize> {
        check_range("get_bytes", index, dst.len(), self.capacity())?;

        dst.copy_from_slice(&self.block.as_slice()[index..index.wrapping_add(dst.len())]);
        Ok(dst.len())
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<usize> {
        check_range("read_bytes", self.reader, dst.len(), self.writer)?;

        let copied = self.get_bytes(self.reader, dst)?;
        self.reader = self.reader.wrapping_add(copied);
        Ok(copied)
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<&mut Self> {
        self.free_at(index, src.len())?.copy_from_slice(src);

        Ok(self)
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<&mut Self> {
        self.ensure_writable(src.len())?;

        let writer = self.writer;
        self.set_bytes(writer, src)?;
        self.writer = writer.wrapping_add(src.len());

        Ok(self)
    }
}

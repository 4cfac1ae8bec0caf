// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{ByteBuffer, Error, Overrides, Result, SegmentedSequence};

/// [`Overrides`] that cap how many bytes may be consumed through a
/// [`BufferFacade`][crate::BufferFacade].
///
/// The readable region reported by the facade is truncated to the remaining limit, and
/// consuming more than the limit fails with [`Error::OutOfBounds`] without touching the inner
/// buffer. Writes and indexed access are not affected.
///
/// This is useful for handing a length-delimited frame to a parser that must not read past it.
///
/// ```
/// use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, ReadLimit};
///
/// let mut facade = BufferFacade::with_overrides(HeapBuffer::from_slice(b"headerbody"), ReadLimit::new(6));
/// assert_eq!(facade.readable(), b"header");
///
/// facade.advance(6)?;
/// assert!(facade.advance(1).is_err());
///
/// assert_eq!(facade.into_inner().readable(), b"body");
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ReadLimit {
    remaining: usize,
}

impl ReadLimit {
    /// Allows at most `limit` bytes to be consumed.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    /// How many more bytes may be consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    fn check(self, operation: &'static str, count: usize) -> Result<()> {
        if count > self.remaining {
            return Err(Error::out_of_bounds(operation, 0, count, self.remaining));
        }

        Ok(())
    }
}

impl<B: ByteBuffer> Overrides<B> for ReadLimit {
    fn readable_len(&self, inner: &B) -> usize {
        inner.readable_len().min(self.remaining)
    }

    fn readable<'b>(&self, inner: &'b B) -> &'b [u8] {
        let readable = inner.readable();
        &readable[..readable.len().min(self.remaining)]
    }

    fn readable_sequence(&self, inner: &B) -> SegmentedSequence<u8> {
        let sequence = inner.readable_sequence();

        if sequence.len() <= self.remaining {
            return sequence;
        }

        sequence
            .slice(0, self.remaining)
            .expect("the limit is shorter than the sequence")
    }

    fn advance(&mut self, inner: &mut B, count: usize) -> Result<()> {
        self.check("advance", count)?;
        inner.advance(count)?;

        self.remaining = self.remaining.wrapping_sub(count);
        Ok(())
    }

    fn read_bytes(&mut self, inner: &mut B, dst: &mut [u8]) -> Result<usize> {
        self.check("read_bytes", dst.len())?;
        let copied = inner.read_bytes(dst)?;

        self.remaining = self.remaining.wrapping_sub(copied);
        Ok(copied)
    }
}

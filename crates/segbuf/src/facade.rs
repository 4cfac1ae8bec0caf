// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{ByteBuffer, Result, SegmentedSequence};

/// Per-operation hooks of a [`BufferFacade`].
///
/// Every method receives the inner buffer and by default forwards the call to it unchanged.
/// Implementations override only the operations they care about, e.g. to record them, to
/// enforce additional bounds or to rewrite results, and inherit pass-through behavior for
/// everything else.
///
/// Read-only operations receive `&self`, so an override that wants to keep state across them
/// needs interior mutability.
///
/// ```
/// use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, Overrides, Result};
///
/// /// Counts how many bytes were consumed through the facade.
/// #[derive(Debug, Default)]
/// struct CountConsumed(usize);
///
/// impl<B: ByteBuffer> Overrides<B> for CountConsumed {
///     fn advance(&mut self, inner: &mut B, count: usize) -> Result<()> {
///         inner.advance(count)?;
///         self.0 += count;
///         Ok(())
///     }
/// }
///
/// let mut facade = BufferFacade::with_overrides(HeapBuffer::from_slice(b"abcdef"), CountConsumed::default());
/// facade.advance(2)?;
/// facade.advance(3)?;
///
/// assert_eq!(facade.readable(), b"f");
/// assert_eq!(facade.overrides().0, 5);
/// # Ok::<(), segbuf::Error>(())
/// ```
pub trait Overrides<B: ByteBuffer> {
    /// Hook for [`ByteBuffer::capacity()`].
    fn capacity(&self, inner: &B) -> usize {
        inner.capacity()
    }

    /// Hook for [`ByteBuffer::max_capacity()`].
    fn max_capacity(&self, inner: &B) -> usize {
        inner.max_capacity()
    }

    /// Hook for [`ByteBuffer::reader_index()`].
    fn reader_index(&self, inner: &B) -> usize {
        inner.reader_index()
    }

    /// Hook for [`ByteBuffer::writer_index()`].
    fn writer_index(&self, inner: &B) -> usize {
        inner.writer_index()
    }

    /// Hook for [`ByteBuffer::readable_len()`].
    fn readable_len(&self, inner: &B) -> usize {
        inner.readable_len()
    }

    /// Hook for [`ByteBuffer::writable_len()`].
    fn writable_len(&self, inner: &B) -> usize {
        inner.writable_len()
    }

    /// Hook for [`ByteBuffer::readable()`].
    fn readable<'b>(&self, inner: &'b B) -> &'b [u8] {
        inner.readable()
    }

    /// Hook for [`ByteBuffer::readable_at()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn readable_at<'b>(&self, inner: &'b B, index: usize, count: usize) -> Result<&'b [u8]> {
        inner.readable_at(index, count)
    }

    /// Hook for [`ByteBuffer::readable_sequence()`].
    fn readable_sequence(&self, inner: &B) -> SegmentedSequence<u8> {
        inner.readable_sequence()
    }

    /// Hook for [`ByteBuffer::readable_sequence_at()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn readable_sequence_at(&self, inner: &B, index: usize, count: usize) -> Result<SegmentedSequence<u8>> {
        inner.readable_sequence_at(index, count)
    }

    /// Hook for [`ByteBuffer::advance()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn advance(&mut self, inner: &mut B, count: usize) -> Result<()> {
        inner.advance(count)
    }

    /// Hook for [`ByteBuffer::commit()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn commit(&mut self, inner: &mut B, count: usize) -> Result<()> {
        inner.commit(count)
    }

    /// Hook for [`ByteBuffer::free()`].
    fn free<'b>(&mut self, inner: &'b mut B) -> &'b mut [u8] {
        inner.free()
    }

    /// Hook for [`ByteBuffer::free_with_hint()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn free_with_hint<'b>(&mut self, inner: &'b mut B, size_hint: usize) -> Result<&'b mut [u8]> {
        inner.free_with_hint(size_hint)
    }

    /// Hook for [`ByteBuffer::free_at()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn free_at<'b>(&mut self, inner: &'b mut B, index: usize, count: usize) -> Result<&'b mut [u8]> {
        inner.free_at(index, count)
    }

    /// Hook for [`ByteBuffer::get_bytes()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn get_bytes(&self, inner: &B, index: usize, dst: &mut [u8]) -> Result<usize> {
        inner.get_bytes(index, dst)
    }

    /// Hook for [`ByteBuffer::read_bytes()`].
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn read_bytes(&mut self, inner: &mut B, dst: &mut [u8]) -> Result<usize> {
        inner.read_bytes(dst)
    }

    /// Hook for [`ByteBuffer::set_bytes()`]. The facade itself is returned to the caller.
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn set_bytes(&mut self, inner: &mut B, index: usize, src: &[u8]) -> Result<()> {
        inner.set_bytes(index, src).map(|_| ())
    }

    /// Hook for [`ByteBuffer::write_bytes()`]. The facade itself is returned to the caller.
    ///
    /// # Errors
    ///
    /// Forwards errors of the inner buffer by default.
    fn write_bytes(&mut self, inner: &mut B, src: &[u8]) -> Result<()> {
        inner.write_bytes(src).map(|_| ())
    }
}

/// Overrides nothing; every operation goes straight to the inner buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl<B: ByteBuffer> Overrides<B> for PassThrough {}

/// A [`ByteBuffer`] that wraps another buffer and forwards every operation to it.
///
/// The facade holds no data of its own. Reads observe the current state of the inner buffer and
/// writes change the state of the inner buffer, so a facade over `&mut B` can be dropped at any
/// time and the inner buffer carries on from where the facade left it.
///
/// Individual operations are customized by supplying an [`Overrides`] implementation.
///
/// ```
/// use segbuf::{BufferFacade, ByteBuffer, HeapBuffer};
///
/// let mut buffer = HeapBuffer::with_capacity(16);
///
/// let mut facade = BufferFacade::new(&mut buffer);
/// facade.write_bytes(b"Hello, world")?.advance(7)?;
/// assert_eq!(facade.readable(), b"world");
///
/// assert_eq!(buffer.reader_index(), 7);
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct BufferFacade<B, O = PassThrough> {
    inner: B,
    overrides: O,
}

impl<B: ByteBuffer> BufferFacade<B> {
    /// Wraps `inner` without overriding any operation.
    #[must_use]
    pub const fn new(inner: B) -> Self {
        Self {
            inner,
            overrides: PassThrough,
        }
    }
}

impl<B: ByteBuffer, O: Overrides<B>> BufferFacade<B, O> {
    /// Wraps `inner`, routing every operation through `overrides`.
    #[must_use]
    pub const fn with_overrides(inner: B, overrides: O) -> Self {
        Self { inner, overrides }
    }
}

impl<B, O> BufferFacade<B, O> {
    /// The wrapped buffer.
    #[must_use]
    pub const fn inner(&self) -> &B {
        &self.inner
    }

    /// The wrapped buffer, for operations that bypass the overrides.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// The overrides the facade routes operations through.
    #[must_use]
    pub const fn overrides(&self) -> &O {
        &self.overrides
    }

    /// The overrides the facade routes operations through.
    #[must_use]
    pub fn overrides_mut(&mut self) -> &mut O {
        &mut self.overrides
    }

    /// Unwraps the facade, returning the inner buffer.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Unwraps the facade, returning the inner buffer and the overrides.
    #[must_use]
    pub fn into_parts(self) -> (B, O) {
        (self.inner, self.overrides)
    }
}

impl<B: ByteBuffer, O: Overrides<B>> ByteBuffer for BufferFacade<B, O> {
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn capacity(&self) -> usize {
        self.overrides.capacity(&self.inner)
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn max_capacity(&self) -> usize {
        self.overrides.max_capacity(&self.inner)
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn reader_index(&self) -> usize {
        self.overrides.reader_index(&self.inner)
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    fn writer_index(&self) -> usize {
        self.overrides.writer_index(&self.inner)
    }

    fn readable_len(&self) -> usize {
        self.overrides.readable_len(&self.inner)
    }

    fn writable_len(&self) -> usize {
        self.overrides.writable_len(&self.inner)
    }

    fn readable(&self) -> &[u8] {
        self.overrides.readable(&self.inner)
    }

    fn readable_at(&self, index: usize, count: usize) -> Result<&[u8]> {
        self.overrides.readable_at(&self.inner, index, count)
    }

    fn readable_sequence(&self) -> SegmentedSequence<u8> {
        self.overrides.readable_sequence(&self.inner)
    }

    fn readable_sequence_at(&self, index: usize, count: usize) -> Result<SegmentedSequence<u8>> {
        self.overrides.readable_sequence_at(&self.inner, index, count)
    }

    fn advance(&mut self, count: usize) -> Result<()> {
        self.overrides.advance(&mut self.inner, count)
    }

    fn commit(&mut self, count: usize) -> Result<()> {
        self.overrides.commit(&mut self.inner, count)
    }

    fn free(&mut self) -> &mut [u8] {
        self.overrides.free(&mut self.inner)
    }

    fn free_with_hint(&mut self, size_hint: usize) -> Result<&mut [u8]> {
        self.overrides.free_with_hint(&mut self.inner, size_hint)
    }

    fn free_at(&mut self, index: usize, count: usize) -> Result<&mut [u8]> {
        self.overrides.free_at(&mut self.inner, index, count)
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<usize> {
        self.overrides.get_bytes(&self.inner, index, dst)
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.overrides.read_bytes(&mut self.inner, dst)
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<&mut Self> {
        self.overrides.set_bytes(&mut self.inner, index, src)?;
        Ok(self)
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<&mut Self> {
        self.overrides.write_bytes(&mut self.inner, src)?;
        Ok(self)
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;

use tracing::{Level, event};

use crate::{ByteBuffer, Overrides, Result, SegmentedSequence};

/// [`Overrides`] that emit a `tracing` event for every data operation performed through a
/// [`BufferFacade`][crate::BufferFacade].
///
/// Each operation emits a `TRACE` event carrying its arguments. Operations that fail
/// additionally emit a `DEBUG` event with the error. Results are forwarded unchanged.
///
/// Cursor and capacity queries are not traced.
///
/// ```
/// use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, TraceOperations};
///
/// let mut facade = BufferFacade::with_overrides(HeapBuffer::with_capacity(16), TraceOperations::new("request"));
/// facade.write_bytes(b"GET /")?;
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TraceOperations {
    label: &'static str,
}

impl TraceOperations {
    /// Creates overrides whose events carry `label` in their `buffer` field.
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self { label }
    }

    /// The label attached to every event.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    fn observe<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.failed(operation, error);
        }

        result
    }

    fn failed(&self, operation: &'static str, error: &impl Display) {
        event!(
            Level::DEBUG,
            message = "buffer operation failed",
            buffer = self.label,
            operation,
            error = %error
        );
    }
}

impl Default for TraceOperations {
    fn default() -> Self {
        Self::new("buffer")
    }
}

impl<B: ByteBuffer> Overrides<B> for TraceOperations {
    fn readable<'b>(&self, inner: &'b B) -> &'b [u8] {
        let readable = inner.readable();
        event!(Level::TRACE, message = "readable", buffer = self.label, len = readable.len());
        readable
    }

    fn readable_at<'b>(&self, inner: &'b B, index: usize, count: usize) -> Result<&'b [u8]> {
        event!(Level::TRACE, message = "readable_at", buffer = self.label, index, count);
        self.observe("readable_at", inner.readable_at(index, count))
    }

    fn readable_sequence(&self, inner: &B) -> SegmentedSequence<u8> {
        let sequence = inner.readable_sequence();
        event!(
            Level::TRACE,
            message = "readable_sequence",
            buffer = self.label,
            len = sequence.len(),
            segments = sequence.segment_count()
        );
        sequence
    }

    fn readable_sequence_at(&self, inner: &B, index: usize, count: usize) -> Result<SegmentedSequence<u8>> {
        event!(Level::TRACE, message = "readable_sequence_at", buffer = self.label, index, count);
        self.observe("readable_sequence_at", inner.readable_sequence_at(index, count))
    }

    fn advance(&mut self, inner: &mut B, count: usize) -> Result<()> {
        event!(Level::TRACE, message = "advance", buffer = self.label, count);
        self.observe("advance", inner.advance(count))
    }

    fn commit(&mut self, inner: &mut B, count: usize) -> Result<()> {
        event!(Level::TRACE, message = "commit", buffer = self.label, count);
        self.observe("commit", inner.commit(count))
    }

    fn free<'b>(&mut self, inner: &'b mut B) -> &'b mut [u8] {
        let free = inner.free();
        event!(Level::TRACE, message = "free", buffer = self.label, len = free.len());
        free
    }

    fn free_with_hint<'b>(&mut self, inner: &'b mut B, size_hint: usize) -> Result<&'b mut [u8]> {
        event!(Level::TRACE, message = "free_with_hint", buffer = self.label, size_hint);
        self.observe("free_with_hint", inner.free_with_hint(size_hint))
    }

    fn free_at<'b>(&mut self, inner: &'b mut B, index: usize, count: usize) -> Result<&'b mut [u8]> {
        event!(Level::TRACE, message = "free_at", buffer = self.label, index, count);
        self.observe("free_at", inner.free_at(index, count))
    }

    fn get_bytes(&self, inner: &B, index: usize, dst: &mut [u8]) -> Result<usize> {
        event!(Level::TRACE, message = "get_bytes", buffer = self.label, index, count = dst.len());
        self.observe("get_bytes", inner.get_bytes(index, dst))
    }

    fn read_bytes(&mut self, inner: &mut B, dst: &mut [u8]) -> Result<usize> {
        event!(Level::TRACE, message = "read_bytes", buffer = self.label, count = dst.len());
        self.observe("read_bytes", inner.read_bytes(dst))
    }

    fn set_bytes(&mut self, inner: &mut B, index: usize, src: &[u8]) -> Result<()> {
        event!(Level::TRACE, message = "set_bytes", buffer = self.label, index, count = src.len());
        self.observe("set_bytes", inner.set_bytes(index, src).map(|_| ()))
    }

    fn write_bytes(&mut self, inner: &mut B, src: &[u8]) -> Result<()> {
        event!(Level::TRACE, message = "write_bytes", buffer = self.label, count = src.len());
        self.observe("write_bytes", inner.write_bytes(src).map(|_| ()))
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Result, SegmentedSequence};

/// The read/write contract of a byte buffer with independent read and write cursors.
///
/// A buffer is a region of `capacity()` bytes split by two cursors:
///
/// ```text
/// 0 ........ reader_index ........ writer_index ........ capacity
///   consumed      readable bytes         free space
/// ```
///
/// Bytes are exposed without copying, either as contiguous slices or as a
/// [`SegmentedSequence`] that may span several memory blocks. Every operation either succeeds
/// completely or fails with an error and leaves the buffer unchanged.
///
/// Indexed operations (`*_at`, [`get_bytes()`][Self::get_bytes], [`set_bytes()`][Self::set_bytes])
/// address absolute positions in the buffer and never move a cursor. Cursor-relative operations
/// ([`advance()`][Self::advance], [`read_bytes()`][Self::read_bytes], [`commit()`][Self::commit],
/// [`write_bytes()`][Self::write_bytes]) move the cursor they are relative to.
pub trait ByteBuffer {
    /// Number of bytes the buffer can hold without growing.
    fn capacity(&self) -> usize;

    /// Number of bytes the buffer may grow to.
    fn max_capacity(&self) -> usize;

    /// Absolute index of the next byte to be read.
    fn reader_index(&self) -> usize;

    /// Absolute index of the next byte to be written.
    fn writer_index(&self) -> usize;

    /// Number of bytes between the read and write cursors.
    fn readable_len(&self) -> usize {
        self.writer_index().saturating_sub(self.reader_index())
    }

    /// Number of bytes between the write cursor and the capacity.
    fn writable_len(&self) -> usize {
        self.capacity().saturating_sub(self.writer_index())
    }

    /// The readable bytes as one contiguous slice.
    fn readable(&self) -> &[u8];

    /// `count` bytes starting at absolute `index`, as one contiguous slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range extends past the
    /// write cursor.
    fn readable_at(&self, index: usize, count: usize) -> Result<&[u8]>;

    /// The readable bytes as a segmented sequence.
    ///
    /// The sequence is a snapshot: writes to the buffer after this call are not visible in it.
    fn readable_sequence(&self) -> SegmentedSequence<u8>;

    /// `count` bytes starting at absolute `index`, as a segmented sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range extends past the
    /// write cursor.
    fn readable_sequence_at(&self, index: usize, count: usize) -> Result<SegmentedSequence<u8>>;

    /// Moves the read cursor forward by `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if fewer than `count` bytes are
    /// readable.
    fn advance(&mut self, count: usize) -> Result<()>;

    /// Moves the write cursor forward by `count` bytes, marking bytes written into
    /// [`free()`][Self::free] space as readable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if fewer than `count` bytes are
    /// writable.
    fn commit(&mut self, count: usize) -> Result<()>;

    /// The free space after the write cursor as one contiguous mutable slice.
    fn free(&mut self) -> &mut [u8];

    /// The free space after the write cursor, first growing the buffer so that at least
    /// `size_hint` bytes are available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if reaching `size_hint` writable
    /// bytes would exceed [`max_capacity()`][Self::max_capacity].
    fn free_with_hint(&mut self, size_hint: usize) -> Result<&mut [u8]>;

    /// `count` bytes of buffer memory starting at absolute `index`, as a mutable slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range extends past the
    /// capacity.
    fn free_at(&mut self, index: usize, count: usize) -> Result<&mut [u8]>;

    /// Copies bytes starting at absolute `index` into `dst`, filling it completely.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range extends past the
    /// capacity.
    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<usize>;

    /// Copies readable bytes into `dst`, filling it completely and moving the read cursor past them.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if fewer than `dst.len()` bytes
    /// are readable.
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<usize>;

    /// Copies `src` into the buffer at absolute `index`. Neither cursor moves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range extends past the
    /// capacity.
    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<&mut Self>
    where
        Self: Sized;

    /// Copies `src` to the write cursor and moves the cursor past it, growing the buffer if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the bytes do not fit even
    /// after growing to [`max_capacity()`][Self::max_capacity].
    fn write_bytes(&mut self, src: &[u8]) -> Result<&mut Self>
    where
        Self: Sized;
}

/// A borrowed buffer is a buffer, so a facade can wrap a buffer it does not own.
impl<B: ByteBuffer> ByteBuffer for &mut B {
    #[cfg_attr(test, mutants::skip)]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    #[cfg_attr(test, mutants::skip)]
    fn max_capacity(&self) -> usize {
        (**self).max_capacity()
    }

    #[cfg_attr(test, mutants::skip)]
    fn reader_index(&self) -> usize {
        (**self).reader_index()
    }

    #[cfg_attr(test, mutants::skip)]
    fn writer_index(&self) -> usize {
        (**self).writer_index()
    }

    fn readable_len(&self) -> usize {
        (**self).readable_len()
    }

    fn writable_len(&self) -> usize {
        (**self).writable_len()
    }

    fn readable(&self) -> &[u8] {
        (**self).readable()
    }

    fn readable_at(&self, index: usize, count: usize) -> Result<&[u8]> {
        (**self).readable_at(index, count)
    }

    fn readable_sequence(&self) -> SegmentedSequence<u8> {
        (**self).readable_sequence()
    }

    fn readable_sequence_at(&self, index: usize, count: usize) -> Result<SegmentedSequence<u8>> {
        (**self).readable_sequence_at(index, count)
    }

    fn advance(&mut self, count: usize) -> Result<()> {
        (**self).advance(count)
    }

    fn commit(&mut self, count: usize) -> Result<()> {
        (**self).commit(count)
    }

    fn free(&mut self) -> &mut [u8] {
        (**self).free()
    }

    fn free_with_hint(&mut self, size_hint: usize) -> Result<&mut [u8]> {
        (**self).free_with_hint(size_hint)
    }

    fn free_at(&mut self, index: usize, count: usize) -> Result<&mut [u8]> {
        (**self).free_at(index, count)
    }

    fn get_bytes(&self, index: usize, dst: &mut [u8]) -> Result<usize> {
        (**self).get_bytes(index, dst)
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<usize> {
        (**self).read_bytes(dst)
    }

    fn set_bytes(&mut self, index: usize, src: &[u8]) -> Result<&mut Self> {
        (**self).set_bytes(index, src)?;
        Ok(self)
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<&mut Self> {
        (**self).write_bytes(src)?;
        Ok(self)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeapBuffer;

    fn exercise(mut buffer: impl ByteBuffer) {
        buffer.write_bytes(b"hello").unwrap().write_bytes(b" world").unwrap();
        buffer.advance(6).unwrap();

        assert_eq!(buffer.readable(), b"world");
        assert_eq!(buffer.readable_len(), 5);
        assert_eq!(buffer.readable_sequence(), b"world");
    }

    #[test]
    fn borrowed_buffer_forwards() {
        let mut buffer = HeapBuffer::with_capacity(16);

        exercise(&mut buffer);

        assert_eq!(buffer.reader_index(), 6);
        assert_eq!(buffer.writer_index(), 11);
        assert_eq!(buffer.readable(), b"world");
    }

    fn set_pattern<B: ByteBuffer>(buffer: &mut B) {
        buffer.set_bytes(4, b"cd").unwrap().set_bytes(0, b"ab").unwrap();
        buffer.commit(6).unwrap();
    }

    #[test]
    fn borrowed_buffer_chains_writes() {
        let mut buffer = HeapBuffer::with_capacity(8);

        set_pattern(&mut &mut buffer);

        assert_eq!(buffer.readable_at(0, 6).unwrap(), b"ab\0\0cd");
    }

    #[test]
    fn default_lengths_follow_cursors() {
        let mut buffer = HeapBuffer::with_capacity(10);
        buffer.commit(7).unwrap();
        buffer.advance(3).unwrap();

        assert_eq!(buffer.readable_len(), 4);
        assert_eq!(buffer.writable_len(), 3);
    }
}

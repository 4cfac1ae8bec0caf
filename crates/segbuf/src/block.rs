// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ops::Range;
use std::sync::Arc;

use crate::error::{Result, check_range};

/// A fixed-size block of memory that owns its elements.
///
/// Segments of a [`SegmentedSequence`][crate::SegmentedSequence] reference ranges inside blocks
/// but never own storage themselves. A block is never resized after creation - growing a buffer
/// means allocating a new block.
///
/// Cloning a block is cheap and shares the storage. The storage is released when the last clone
/// is dropped, which happens when no segment or buffer references it anymore.
#[derive(Debug)]
pub struct OwnedBlock<T> {
    storage: Arc<[T]>,
}

impl<T> OwnedBlock<T> {
    /// Takes ownership of the provided elements as a new block.
    #[must_use]
    pub fn new(elements: impl Into<Arc<[T]>>) -> Self {
        Self {
            storage: elements.into(),
        }
    }

    /// Number of elements in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the block has zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// All elements of the block.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// References a sub-range of the block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`][crate::Error::OutOfBounds] if the range does not lie
    /// within the block.
    pub fn range(&self, range: Range<usize>) -> Result<&[T]> {
        let count = range.end.checked_sub(range.start).unwrap_or(usize::MAX);
        check_range("block range", range.start, count, self.len())?;

        Ok(&self.storage[range])
    }

    /// Whether `self` and `other` share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<T: Clone> OwnedBlock<T> {
    /// Mutable access to the storage, first copying it if any other clone still shares it.
    ///
    /// Clones that existed before the call keep observing the old contents.
    pub(crate) fn make_mut(&mut self) -> &mut [T] {
        if Arc::get_mut(&mut self.storage).is_none() {
            self.storage = Arc::from(&*self.storage);
        }

        Arc::get_mut(&mut self.storage).expect("storage was made unique right above")
    }
}

impl<T: Clone + Default> OwnedBlock<T> {
    /// Allocates a block of `len` default-initialized elements.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self::new(vec![T::default(); len])
    }
}

impl<T> Clone for OwnedBlock<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ErrorKind;

    assert_impl_all!(OwnedBlock<u8>: Send, Sync, Clone);

    #[test]
    fn range_within_bounds() {
        let block = OwnedBlock::new(vec![1_u8, 2, 3, 4, 5]);

        assert_eq!(block.len(), 5);
        assert_eq!(block.range(1..4).unwrap(), &[2, 3, 4]);
        assert_eq!(block.range(5..5).unwrap(), &[] as &[u8]);
        assert_eq!(block.range(0..5).unwrap(), block.as_slice());
    }

    #[test]
    fn range_outside_bounds_is_error() {
        let block = OwnedBlock::new(vec![0_u8; 4]);

        assert_eq!(block.range(2..5).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(block.range(6..6).unwrap_err().kind(), ErrorKind::OutOfBounds);

        #[expect(clippy::reversed_empty_ranges, reason = "testing inverted range rejection")]
        let inverted = 3..1;
        assert_eq!(block.range(inverted).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn with_len_is_default_initialized() {
        let block = OwnedBlock::<u8>::with_len(16);

        assert_eq!(block.len(), 16);
        assert!(block.as_slice().iter().all(|b| *b == 0));
        assert!(OwnedBlock::<u8>::with_len(0).is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let block = OwnedBlock::new(vec![7_u8; 3]);
        let clone = block.clone();

        assert!(block.ptr_eq(&clone));
        assert!(!block.ptr_eq(&OwnedBlock::new(vec![7_u8; 3])));
    }

    #[test]
    fn make_mut_detaches_shared_storage() {
        let mut block = OwnedBlock::new(vec![1_u8, 2, 3]);
        let snapshot = block.clone();

        block.make_mut()[0] = 9;

        assert_eq!(block.as_slice(), &[9, 2, 3]);
        assert_eq!(snapshot.as_slice(), &[1, 2, 3]);
        assert!(!block.ptr_eq(&snapshot));

        // Now unique, so no further copy happens.
        let detached = block.as_slice().as_ptr();
        block.make_mut()[1] = 8;
        assert_eq!(block.as_slice().as_ptr(), detached);
        assert_eq!(block.as_slice(), &[9, 8, 3]);
    }
}

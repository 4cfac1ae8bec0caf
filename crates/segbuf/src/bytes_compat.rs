// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compatibility with types from the `bytes` package.

use bytes::Buf;

use crate::SequenceReader;

impl Buf for SequenceReader<u8> {
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    #[inline]
    fn remaining(&self) -> usize {
        self.remaining()
    }

    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    #[inline]
    fn chunk(&self) -> &[u8] {
        self.first_slice()
    }

    fn advance(&mut self, cnt: usize) {
        // `Buf` has no way to report errors, overrunning is a contract violation.
        Self::advance(self, cnt).expect("attempted to advance past the end of the sequence");
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChainBuilder, OwnedBlock, SegmentedSequence};

    fn two_segments() -> SegmentedSequence<u8> {
        let mut builder = ChainBuilder::new();
        let first = builder.add_block(OwnedBlock::new(*b"\x00\x01\x02"));
        let second = builder.add_block(OwnedBlock::new(*b"\x03\x04\x05\x06\x07"));
        builder.push(first, 0..3).unwrap();
        builder.push(second, 0..5).unwrap();

        SegmentedSequence::from_chain(builder.build().unwrap())
    }

    #[test]
    fn buf_compat() {
        let mut reader = two_segments().reader();

        assert_eq!(Buf::remaining(&reader), 8);
        assert_eq!(reader.chunk(), &[0, 1, 2]);

        // Reads spanning the segment boundary are assembled by `bytes`.
        assert_eq!(reader.get_u32(), 0x0001_0203);
        assert_eq!(reader.chunk(), &[4, 5, 6, 7]);

        Buf::advance(&mut reader, 2);
        assert_eq!(reader.get_u16_le(), 0x0706);
        assert!(!reader.has_remaining());
    }

    #[test]
    fn copy_to_bytes_spans_segments() {
        let mut reader = two_segments().reader();

        let bytes = reader.copy_to_bytes(6);
        assert_eq!(bytes.as_ref(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(Buf::remaining(&reader), 2);
    }

    #[test]
    #[should_panic]
    fn advance_past_end_panics() {
        let mut reader = two_segments().reader();
        Buf::advance(&mut reader, 9);
    }
}

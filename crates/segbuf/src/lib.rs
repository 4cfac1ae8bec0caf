// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Zero-copy byte buffers with overridable operations and segmented byte sequences.
//!
//! A segmented sequence is a logical run of elements stored in one or more memory blocks:
//!
//! * The elements are not required to be consecutive in memory. Each segment is a range inside
//!   some [`OwnedBlock`] and the segments are linked in order.
//! * The elements are immutable. A [`SegmentedSequence`] can be cloned cheaply and shared with
//!   any number of threads.
//!
//! # Buffers
//!
//! The [`ByteBuffer`] trait is the contract of a byte buffer with a read cursor and a write
//! cursor. It exposes the readable bytes without copying, either as a contiguous slice via
//! [`readable()`][ByteBuffer::readable] or as a [`SegmentedSequence`] via
//! [`readable_sequence()`][ByteBuffer::readable_sequence], and the free space after the write
//! cursor via [`free()`][ByteBuffer::free]. Bytes can also be copied in and out with the bulk
//! operations ([`get_bytes()`][ByteBuffer::get_bytes], [`read_bytes()`][ByteBuffer::read_bytes],
//! [`set_bytes()`][ByteBuffer::set_bytes], [`write_bytes()`][ByteBuffer::write_bytes]).
//!
//! [`HeapBuffer`] is a contiguous implementation of the contract backed by a single block.
//!
//! # Facades
//!
//! A [`BufferFacade`] wraps any [`ByteBuffer`], owned or mutably borrowed, and is a
//! [`ByteBuffer`] itself. By default it forwards every operation unchanged. Individual
//! operations are customized by supplying an [`Overrides`] implementation, without having to
//! reimplement the rest of the contract:
//!
//! * [`TraceOperations`] emits a `tracing` event for every operation.
//! * [`ReadLimit`] caps how many bytes can be consumed through the facade.
//!
//! ```
//! use segbuf::{BufferFacade, ByteBuffer, HeapBuffer, ReadLimit};
//!
//! let mut buffer = HeapBuffer::with_capacity(64);
//! buffer.write_bytes(b"\x00\x05hello, world")?;
//!
//! let mut length = [0_u8; 2];
//! buffer.read_bytes(&mut length)?;
//!
//! // The parser only gets to see the frame, even though more bytes are readable.
//! let frame = BufferFacade::with_overrides(&mut buffer, ReadLimit::new(u16::from_be_bytes(length).into()));
//! assert_eq!(frame.readable_sequence(), b"hello");
//! # Ok::<(), segbuf::Error>(())
//! ```
//!
//! # Sequences
//!
//! A [`SegmentedSequence`] is built from a [`SegmentChain`], which is assembled once through a
//! [`ChainBuilder`] and never modified afterwards. Nodes of the chain live in an arena and link
//! to each other by [`NodeIndex`], always forward in append order.
//!
//! The segments of a sequence are visited via [`segments()`][SegmentedSequence::segments]. For
//! consuming the elements front to back, [`reader()`][SegmentedSequence::reader] returns a
//! [`SequenceReader`], which also implements `bytes::Buf` when the `bytes-compat` feature is
//! enabled.
//!
//! # Test fixtures
//!
//! With the `test-util` feature, the `fixtures` module provides deterministic builders that
//! split or compose test inputs into sequences with many segments, for exercising code paths at
//! segment boundaries.

mod block;
mod buffer;
#[cfg(feature = "bytes-compat")]
mod bytes_compat;
mod chain;
mod constants;
mod error;
mod facade;
mod heap;
mod read_limit;
mod reader;
mod sequence;
mod trace_operations;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use block::OwnedBlock;
pub use buffer::ByteBuffer;
pub use chain::{BlockIndex, ChainBuilder, NodeIndex, SegmentChain, SegmentNode};
pub use constants::{DEFAULT_MAX_CAPACITY, MAX_INLINE_SEGMENTS};
pub use error::{Error, ErrorKind, Result};
pub use facade::{BufferFacade, Overrides, PassThrough};
pub use heap::HeapBuffer;
pub use read_limit::ReadLimit;
pub use reader::SequenceReader;
pub use sequence::{SegmentedSequence, SequencePosition, Segments};
pub use trace_operations::TraceOperations;

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// How many segments (and blocks) a chain stores inline before spilling to the heap.
///
/// Most chains built from buffers have a single segment and most fixtures a handful.
pub const MAX_INLINE_SEGMENTS: usize = 4;

/// The maximum capacity a [`HeapBuffer`][crate::HeapBuffer] may grow to unless configured otherwise.
pub const DEFAULT_MAX_CAPACITY: usize = 0x7FFF_FFFF;

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! An unpublished crate containing testing utilities for use within this repo.

mod log;

pub use log::*;

/// Standard test data generator - a repeating sequence of bytes from 0 to 255.
pub fn repeating_incrementing_bytes() -> impl Iterator<Item = u8> {
    (0..=u8::MAX).cycle()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incrementing_bytes_wrap_around() {
        let bytes: Vec<u8> = repeating_incrementing_bytes().skip(254).take(4).collect();
        assert_eq!(bytes, vec![254, 255, 0, 1]);
    }
}

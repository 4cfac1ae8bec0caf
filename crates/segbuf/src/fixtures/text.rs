// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::fixtures::SubtractiveRng;
use crate::{Error, Result};

/// The seed [`TextFill::new()`] uses.
pub const DEFAULT_TEXT_SEED: i32 = 42;

/// Fills byte regions with delimited ASCII decimal integers, for testing text parsers.
///
/// Every value is drawn from `(min_value, max_value)` and then jittered by -1, 0 or +1, so
/// values at both bounds are produced as well. Values are written one after another, each
/// followed by the delimiter, until the next value and its delimiter no longer fit.
///
/// Adjacent bounds (`max_value == min_value + 1`) leave nothing to draw from. Every draw then
/// yields `max_value` and the jitter spreads the written values over
/// `[min_value, max_value + 1]`.
///
/// ```
/// use segbuf::fixtures::TextFill;
///
/// let mut text = [0_u8; 32];
/// let written = TextFill::new().fill(&mut text, 0, 1000)?;
///
/// assert_eq!(&text[..written], b"667 126 168 724 175 234 505 380 ");
/// # Ok::<(), segbuf::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TextFill {
    seed: i32,
    delimiter: u8,
}

impl TextFill {
    /// Creates a filler using [`DEFAULT_TEXT_SEED`] and a space as delimiter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seed: DEFAULT_TEXT_SEED,
            delimiter: b' ',
        }
    }

    /// Replaces the seed of the value stream.
    #[must_use]
    pub const fn with_seed(self, seed: i32) -> Self {
        Self { seed, ..self }
    }

    /// Replaces the byte written after every value.
    #[must_use]
    pub const fn with_delimiter(self, delimiter: u8) -> Self {
        Self { delimiter, ..self }
    }

    /// The seed of the value stream.
    #[must_use]
    pub const fn seed(&self) -> i32 {
        self.seed
    }

    /// The byte written after every value.
    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Writes delimited values into `target` and returns the number of bytes written.
    ///
    /// Bytes after the last delimiter are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `min_value` is not smaller than `max_value`.
    pub fn fill(&self, target: &mut [u8], min_value: i32, max_value: i32) -> Result<usize> {
        if min_value >= max_value {
            return Err(Error::invalid_configuration(format!(
                "min_value {min_value} must be smaller than max_value {max_value}"
            )));
        }

        let mut rng = SubtractiveRng::new(self.seed);
        let mut written = 0;

        loop {
            let value = rng
                .next_in_range(min_value + 1, max_value)
                .wrapping_add(rng.next_in_range(-1, 2));
            let digits = value.to_string();

            let Some(slot) = target.get_mut(written..written + digits.len() + 1) else {
                return Ok(written);
            };

            let (number, delimiter) = slot.split_at_mut(digits.len());
            number.copy_from_slice(digits.as_bytes());
            delimiter[0] = self.delimiter;

            written += slot.len();
        }
    }
}

impl Default for TextFill {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::str;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn fills_until_no_value_fits() {
        let mut text = [0_u8; 16];
        let filler = TextFill::new().with_seed(7).with_delimiter(b',');

        let written = filler.fill(&mut text, -50, 50).unwrap();

        assert_eq!(written, 15);
        assert_eq!(&text, b"-11,15,-12,-44,\0");
    }

    #[test]
    fn values_respect_bounds() {
        let mut text = vec![0_u8; 4096];
        let written = TextFill::new().fill(&mut text, 10, 20).unwrap();

        let text = str::from_utf8(&text[..written]).unwrap();
        let values: Vec<i32> = text.split_terminator(' ').map(|v| v.parse().unwrap()).collect();

        assert!(!values.is_empty());
        assert!(values.iter().all(|v| (10..=20).contains(v)));
        assert!(values.contains(&10));
        assert!(values.contains(&20));
    }

    #[test]
    fn adjacent_bounds_jitter_past_max() {
        let mut text = [0_u8; 16];

        let written = TextFill::new().fill(&mut text, 0, 1).unwrap();

        // Every draw from the empty range (1, 1) still consumes a sample, so the jitter stream
        // stays aligned with seeded `System.Random`.
        assert_eq!(written, 16);
        assert_eq!(&text, b"0 1 0 1 2 0 0 0 ");
    }

    #[test]
    fn too_small_target_is_untouched() {
        let mut text = [0_u8; 3];

        assert_eq!(TextFill::new().fill(&mut text, 0, 1000).unwrap(), 0);
        assert_eq!(text, [0, 0, 0]);
    }

    #[test]
    fn same_seed_same_text() {
        let mut a = [0_u8; 64];
        let mut b = [0_u8; 64];

        let written = TextFill::new().fill(&mut a, -1000, 1000).unwrap();
        assert_eq!(TextFill::default().fill(&mut b, -1000, 1000).unwrap(), written);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_range() {
        let err = TextFill::new().fill(&mut [0; 8], 5, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}

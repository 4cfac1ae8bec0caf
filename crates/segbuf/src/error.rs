// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// An error signaled by a buffer, a segmented sequence or the fixture builder.
///
/// All errors are contract violations detected synchronously at the call site. Nothing is
/// retried and nothing is partially applied: when an operation fails, the state of the
/// buffer or sequence it was called on is exactly as it was before the call.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The caller supplied inputs that cannot describe a valid fixture or buffer, e.g. an
    /// empty input where at least one element is required or size bounds where the minimum
    /// exceeds the maximum.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable description of the rejected configuration.
        reason: String,
    },

    /// An operation addressed indices or counts outside the valid range of a buffer or sequence.
    #[error("{operation} out of bounds: index {index} + count {count} exceeds {bound}")]
    OutOfBounds {
        /// The operation that was rejected.
        operation: &'static str,
        /// The index (or cursor position) the operation started at.
        index: usize,
        /// The number of elements the operation wanted to touch.
        count: usize,
        /// The exclusive upper bound the operation had to stay within.
        bound: usize,
    },
}

impl Error {
    pub(crate) fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }

    pub(crate) const fn out_of_bounds(operation: &'static str, index: usize, count: usize, bound: usize) -> Self {
        Self::OutOfBounds {
            operation,
            index,
            count,
            bound,
        }
    }

    /// The category of the error, for matching without destructuring the variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            Self::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        }
    }
}

/// Categories of [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`Error::InvalidConfiguration`].
    InvalidConfiguration,
    /// See [`Error::OutOfBounds`].
    OutOfBounds,
}

/// A `Result` that may contain an [`Error`] from this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Validates that `index..index + count` lies within `0..bound`, without overflowing.
pub(crate) fn check_range(operation: &'static str, index: usize, count: usize, bound: usize) -> Result<()> {
    match index.checked_add(count) {
        Some(end) if end <= bound => Ok(()),
        _ => Err(Error::out_of_bounds(operation, index, count, bound)),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync);

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            Error::invalid_configuration("min_size must be at least 1").kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(Error::out_of_bounds("advance", 0, 5, 4).kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn display_names_the_operation() {
        let e = Error::out_of_bounds("get_bytes", 10, 4, 12);
        assert_eq!(e.to_string(), "get_bytes out of bounds: index 10 + count 4 exceeds 12");

        let e = Error::invalid_configuration("input list is empty");
        assert_eq!(e.to_string(), "invalid configuration: input list is empty");
    }

    #[test]
    fn check_range_accepts_exact_fit() {
        check_range("test", 2, 3, 5).unwrap();
        check_range("test", 5, 0, 5).unwrap();
    }

    #[test]
    fn check_range_rejects_overrun_and_overflow() {
        assert_eq!(check_range("test", 3, 3, 5).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(check_range("test", usize::MAX, 2, 5).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(check_range("test", 6, 0, 5).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

const MBIG: i32 = i32::MAX;
const MSEED: i32 = 161_803_398;
const STATE_LEN: usize = 56;
const LAG: usize = 21;

/// Knuth's subtractive pseudo-random generator, as used by seeded `System.Random` instances in
/// .NET.
///
/// The generator is not suitable for anything but reproducible test data. Its value is that
/// the same seed yields the same stream on every platform, which makes fixtures built from it
/// identical across runs. The raw stream and [`next_in_range()`][Self::next_in_range] match
/// `System.Random` with the same seed for every valid range. Fixtures may still draw from
/// different ranges than their .NET counterparts, see
/// [`SequenceBuilder::split_random()`][crate::fixtures::SequenceBuilder::split_random].
///
/// ```
/// use segbuf::fixtures::SubtractiveRng;
///
/// let mut rng = SubtractiveRng::new(42);
/// let value = rng.next_in_range(1, 10);
///
/// assert!((1..10).contains(&value));
/// assert_eq!(SubtractiveRng::new(42).next_in_range(1, 10), value);
/// ```
#[derive(Clone, Debug)]
pub struct SubtractiveRng {
    state: [i32; STATE_LEN],
    next: usize,
    next_lagged: usize,
}

impl SubtractiveRng {
    /// Creates a generator seeded with `seed`. Seeds that differ only in sign produce the same
    /// stream.
    #[must_use]
    pub fn new(seed: i32) -> Self {
        let subtraction = if seed == i32::MIN { i32::MAX } else { seed.abs() };

        let mut state = [0_i32; STATE_LEN];
        let mut mj = MSEED.wrapping_sub(subtraction);
        state[STATE_LEN - 1] = mj;
        let mut mk: i32 = 1;

        for i in 1..STATE_LEN - 1 {
            let ii = (LAG * i) % (STATE_LEN - 1);
            state[ii] = mk;
            mk = wrap_into_range(mj.wrapping_sub(mk));
            mj = state[ii];
        }

        for _ in 0..4 {
            for i in 1..STATE_LEN {
                state[i] = wrap_into_range(state[i].wrapping_sub(state[1 + (i + 30) % (STATE_LEN - 1)]));
            }
        }

        Self {
            state,
            next: 0,
            next_lagged: LAG,
        }
    }

    /// Returns the next raw value in `[0, i32::MAX)`.
    pub fn next_raw(&mut self) -> i32 {
        self.next = advance_index(self.next);
        self.next_lagged = advance_index(self.next_lagged);

        let mut value = self.state[self.next].wrapping_sub(self.state[self.next_lagged]);

        if value == MBIG {
            value -= 1;
        }

        let value = wrap_into_range(value);
        self.state[self.next] = value;
        value
    }

    /// Returns the next value in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) * (1.0 / f64::from(MBIG))
    }

    /// Returns the next value in `[min, max)`.
    ///
    /// An empty range (`max == min`) yields `min` but still consumes a sample, like
    /// `System.Random` does. An inverted range (`max < min`) yields `min` without consuming
    /// anything; `System.Random` rejects it.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "the scaled sample always lies within the requested i32 range"
    )]
    pub fn next_in_range(&mut self, min: i32, max: i32) -> i32 {
        let range = i64::from(max) - i64::from(min);

        if range < 0 {
            return min;
        }

        if range == 0 {
            self.next_f64();
            return min;
        }

        if range <= i64::from(i32::MAX) {
            ((self.next_f64() * range as f64) as i32).wrapping_add(min)
        } else {
            ((self.next_f64_for_large_range() * range as f64) as i64 + i64::from(min)) as i32
        }
    }

    /// A sample in `[0.0, 1.0)` with more than 31 bits of entropy, for ranges wider than `i32::MAX`.
    #[expect(clippy::suboptimal_flops, reason = "a fused multiply-add would change the reproducible result")]
    fn next_f64_for_large_range(&mut self) -> f64 {
        let mut value = self.next_raw();

        if self.next_raw() % 2 == 0 {
            value = -value;
        }

        (f64::from(value) + f64::from(i32::MAX - 1)) / (2.0 * f64::from(i32::MAX) - 1.0)
    }
}

const fn advance_index(index: usize) -> usize {
    if index + 1 >= STATE_LEN { 1 } else { index + 1 }
}

const fn wrap_into_range(value: i32) -> i32 {
    if value < 0 { value.wrapping_add(MBIG) } else { value }
}

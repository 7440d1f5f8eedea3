//! Seeded, reproducible shuffle for the voting ballot.
//!
//! A linear congruential generator (`s' = s * 1664525 + 1013904223 mod 2^32`)
//! drives a Fisher-Yates shuffle from the last position down. The same seed
//! and input always give the same order, so a stored game replays exactly.

/// Linear congruential generator over `u32`
#[derive(Debug, Clone, Copy)]
struct Lcg(u32);

impl Lcg {
    const MULTIPLIER: u32 = 1_664_525;
    const INCREMENT: u32 = 1_013_904_223;

    /// Uniform index in `0..bound`.
    ///
    /// Equal to `floor(s' / 2^32 * bound)` computed exactly in integers.
    fn next_index(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        ((u64::from(self.0) * bound as u64) >> 32) as usize
    }
}

/// Return a shuffled copy of `items`.
///
/// # Examples
///
/// ```
/// use fictionary_room::shuffle::seeded_shuffle;
///
/// assert_eq!(seeded_shuffle(&["p1", "p2", "p3"], 1), vec!["p2", "p3", "p1"]);
/// assert_eq!(seeded_shuffle(&["p1", "p2", "p3"], 1), seeded_shuffle(&["p1", "p2", "p3"], 1));
/// ```
#[must_use]
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut rng = Lcg(seed);
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.next_index(i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_permutations() {
        assert_eq!(seeded_shuffle(&[0, 1, 2, 3, 4], 1), vec![0, 2, 3, 4, 1]);
        assert_eq!(seeded_shuffle(&[0, 1, 2, 3, 4], 42), vec![2, 3, 4, 0, 1]);
        assert_eq!(seeded_shuffle(&["p1", "p2", "p3"], 7), vec!["p3", "p2", "p1"]);
        assert_eq!(seeded_shuffle(&[0, 1, 2, 3, 4], 123_456), vec![2, 1, 3, 4, 0]);
    }

    #[test]
    fn empty_and_single_are_unchanged() {
        assert!(seeded_shuffle::<u8>(&[], 9).is_empty());
        assert_eq!(seeded_shuffle(&["only"], 9), vec!["only"]);
    }

    proptest! {
        #[test]
        fn same_seed_same_order(items in proptest::collection::vec(any::<u16>(), 0..16), seed in any::<u32>()) {
            prop_assert_eq!(seeded_shuffle(&items, seed), seeded_shuffle(&items, seed));
        }

        #[test]
        fn output_is_a_permutation(len in 0_usize..16, seed in any::<u32>()) {
            let items: Vec<usize> = (0..len).collect();
            let mut shuffled = seeded_shuffle(&items, seed);
            shuffled.sort_unstable();
            prop_assert_eq!(shuffled, items);
        }
    }
}

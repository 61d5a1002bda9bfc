use std::cmp::Reverse;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use verse_protocol::BookId;

use crate::DatasetError;

/// Fixed-point scale ratios are converted to before allocation.
const SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub dev: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self { train: 0.8, dev: 0.1, test: 0.1 }
    }
}

impl SplitRatios {
    pub fn validate(&self) -> Result<(), DatasetError> {
        for (name, value) in [("train", self.train), ("dev", self.dev), ("test", self.test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(DatasetError::InvalidRatios(format!("{name} ratio is {value}")));
            }
            if value * SCALE >= u64::MAX as f64 {
                return Err(DatasetError::InvalidRatios(format!("{name} ratio {value} is too large")));
            }
        }
        if self.weights().iter().all(|w| *w == 0) {
            return Err(DatasetError::InvalidRatios("ratios sum to zero".to_string()));
        }
        Ok(())
    }

    fn weights(&self) -> [u64; 3] {
        [self.train, self.dev, self.test].map(|r| (r * SCALE).round() as u64)
    }
}

/// Largest-remainder allocation of `n` items over train/dev/test.
///
/// Integer weights keep remainders exact, so ties are real ties. When the
/// leftover items cannot serve every tied partition, they go round the tied
/// group starting at `rotation`, so books with different rotations favour
/// different partitions. The result always sums to `n`.
pub fn allocate(n: usize, ratios: &SplitRatios, rotation: usize) -> [usize; 3] {
    let weights = ratios.weights().map(u128::from);
    let total: u128 = weights.iter().sum();
    if total == 0 {
        return [n, 0, 0];
    }

    let n = n as u128;
    let mut counts = [0usize; 3];
    let mut remainders = [0u128; 3];
    for (i, w) in weights.iter().enumerate() {
        counts[i] = (n * w / total) as usize;
        remainders[i] = n * w % total;
    }

    let mut leftover = n as usize - counts.iter().sum::<usize>();
    let mut order = [0usize, 1, 2];
    order.sort_by_key(|&i| Reverse(remainders[i]));

    let mut at = 0;
    while leftover > 0 && at < order.len() {
        let tied: Vec<usize> = order[at..]
            .iter()
            .copied()
            .take_while(|&i| remainders[i] == remainders[order[at]])
            .collect();
        if tied.len() <= leftover {
            for &i in &tied {
                counts[i] += 1;
            }
            leftover -= tied.len();
        } else {
            for k in 0..leftover {
                counts[tied[(rotation + k) % tied.len()]] += 1;
            }
            leftover = 0;
        }
        at += tied.len();
    }
    counts
}

/// Independent RNG stream per book, so adding a book never reshuffles another.
pub fn book_rng(seed: u64, book: BookId) -> StdRng {
    StdRng::seed_from_u64(seed ^ u64::from(book.0).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        let ratios = SplitRatios::default();
        assert_eq!(allocate(10, &ratios, 0), [8, 1, 1]);
        assert_eq!(allocate(100, &ratios, 5), [80, 10, 10]);
        assert_eq!(allocate(0, &ratios, 0), [0, 0, 0]);
    }

    #[test]
    fn test_remainder_ties_rotate() {
        let ratios = SplitRatios::default();
        // 5 * 0.1 leaves dev and test tied on half an item each
        assert_eq!(allocate(5, &ratios, 0), [4, 1, 0]);
        assert_eq!(allocate(5, &ratios, 1), [4, 0, 1]);
        assert_eq!(allocate(5, &ratios, 2), [4, 1, 0]);

        // Three-way tie with one item left over
        let thirds = SplitRatios { train: 1.0, dev: 1.0, test: 1.0 };
        assert_eq!(allocate(1, &thirds, 0), [1, 0, 0]);
        assert_eq!(allocate(1, &thirds, 1), [0, 1, 0]);
        assert_eq!(allocate(2, &thirds, 2), [1, 0, 1]);
    }

    #[test]
    fn test_tied_leftovers_balance_across_books() {
        let ratios = SplitRatios::default();
        let mut totals = [0usize; 3];
        for book in 1..=66 {
            let counts = allocate(5, &ratios, book);
            for (total, count) in totals.iter_mut().zip(counts) {
                *total += count;
            }
        }
        assert_eq!(totals, [264, 33, 33]);
    }

    #[test]
    fn test_huge_ratios() {
        let big = SplitRatios { train: 1e13, dev: 1e13, test: 1e13 };
        assert!(big.validate().is_ok());
        assert_eq!(allocate(9, &big, 0), [3, 3, 3]);
        assert_eq!(allocate(10, &big, 0).iter().sum::<usize>(), 10);

        let overflowing = SplitRatios { train: 1e20, dev: 0.1, test: 0.1 };
        assert!(matches!(overflowing.validate(), Err(DatasetError::InvalidRatios(_))));
    }

    #[test]
    fn test_validation() {
        assert!(SplitRatios::default().validate().is_ok());
        assert!(SplitRatios { train: 8.0, dev: 1.0, test: 1.0 }.validate().is_ok());
        assert!(SplitRatios { train: -0.1, dev: 0.6, test: 0.5 }.validate().is_err());
        assert!(SplitRatios { train: f64::NAN, dev: 0.1, test: 0.1 }.validate().is_err());
        assert!(SplitRatios { train: 0.0, dev: 0.0, test: 0.0 }.validate().is_err());
    }

    #[test]
    fn test_book_streams_differ() {
        use rand::Rng;
        let a: u64 = book_rng(7, BookId(1)).gen();
        let b: u64 = book_rng(7, BookId(2)).gen();
        let again: u64 = book_rng(7, BookId(1)).gen();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    proptest! {
        #[test]
        fn test_allocation_is_total(
            n in 0usize..5000,
            train in 0.0f64..10.0,
            dev in 0.0f64..10.0,
            test in 0.01f64..10.0,
            rotation in 0usize..100,
        ) {
            let ratios = SplitRatios { train, dev, test };
            let counts = allocate(n, &ratios, rotation);
            prop_assert_eq!(counts.iter().sum::<usize>(), n);
        }
    }
}
